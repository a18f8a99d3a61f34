/*!

  Command-line interface: solve a puzz.link URL and print an ASCII rendering of the
  projected answer.

*/

use chocomino::doublechoco;
use chocomino::evolmino;
use chocomino::Error;
use chocomino::doublechoco::Border;
use chocomino::evolmino::Cell;

fn print_doublechoco(problem: &doublechoco::Problem, answer: &doublechoco::Answer) {
  let height = problem.height();
  let width = problem.width();

  for y in -1..height * 2 {
    for x in -1..width * 2 {
      if (y & 1) == 0 && (x & 1) == 0 {
        let color = problem.color(y / 2, x / 2);
        print!("{}", if color == 1 { "#" } else { " " });
      } else if (y & 1) == 1 && (x & 1) == 1 {
        print!("+");
      } else if (y & 1) == 1 {
        if y == -1 || y == height * 2 - 1 {
          print!("-");
          continue;
        }
        match answer.vertical.get(y / 2, x / 2) {
          Border::Undecided => print!("?"),
          Border::Wall      => print!("-"),
          Border::Connected => print!(" "),
        }
      } else {
        if x == -1 || x == width * 2 - 1 {
          print!("|");
          continue;
        }
        match answer.horizontal.get(y / 2, x / 2) {
          Border::Undecided => print!("?"),
          Border::Wall      => print!("|"),
          Border::Connected => print!(" "),
        }
      }
    }
    println!();
  }
}

fn print_evolmino(answer: &evolmino::Answer) {
  for y in 0..answer.height() {
    for x in 0..answer.width() {
      match answer.get(y, x) {
        Cell::Square    => print!("# "),
        Cell::Empty     => print!("x "),
        Cell::Undecided => print!(". "),
      }
    }
    println!();
  }
}

fn run(url: &str) -> Result<(), Error> {
  if url.starts_with("https://puzz.link/p?dbchoco/") {
    let problem = doublechoco::Problem::parse_url(url).ok_or(Error::InvalidUrl)?;
    let answer = doublechoco::solve(&problem).ok_or(Error::NoAnswer)?;
    print_doublechoco(&problem, &answer);
    Ok(())
  } else if url.starts_with("https://puzz.link/p?evolmino/") {
    let problem = evolmino::Problem::parse_url(url).ok_or(Error::InvalidUrl)?;
    let answer = evolmino::solve(&problem).ok_or(Error::NoAnswer)?;
    print_evolmino(&answer);
    Ok(())
  } else {
    Err(Error::InvalidUrl)
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let url = match std::env::args().nth(1) {
    Some(url) => url,
    None => {
      eprintln!("usage: chocomino <puzz.link url>");
      std::process::exit(2);
    }
  };

  if let Err(e) = run(&url) {
    println!("Error: {}", e);
    std::process::exit(1);
  }
}
