/*!

  The web-facing entry point: solve a puzz.link URL and render the answer as the JSON
  document format consumed by the grid viewer.

*/

use json::JsonValue;

use crate::doublechoco;
use crate::doublechoco::Border;
use crate::errors::Error;
use crate::evolmino;
use crate::evolmino::{Cell, ProblemCell};

fn solve_doublechoco(url: &str) -> Result<JsonValue, Error> {
  let problem = doublechoco::Problem::parse_url(url).ok_or(Error::InvalidUrl)?;
  let answer = doublechoco::solve(&problem).ok_or(Error::NoAnswer)?;

  let height = problem.height();
  let width = problem.width();
  let mut data: Vec<JsonValue> = Vec::new();

  for y in 0..height {
    for x in 0..width {
      if problem.color(y, x) == 1 {
        data.push(json::object! {
          "y": y * 2 + 1,
          "x": x * 2 + 1,
          "color": "#eeeeee",
          "item": "fill"
        });
      }
      if problem.num(y, x) > 0 {
        data.push(json::object! {
          "y": y * 2 + 1,
          "x": x * 2 + 1,
          "color": "black",
          "item": { "kind": "text", "data": problem.num(y, x).to_string() }
        });
      }
    }
  }

  for y in 0..height {
    for x in 0..width {
      if y < height - 1 {
        let border = answer.vertical.get(y, x);
        if border != Border::Wall {
          data.push(json::object! {
            "y": y * 2 + 2, "x": x * 2 + 1, "color": "#cccccc", "item": "wall"
          });
        }
        if border != Border::Undecided {
          let kind = if border == Border::Wall { "boldWall" } else { "cross" };
          data.push(json::object! {
            "y": y * 2 + 2, "x": x * 2 + 1, "color": "green", "item": kind
          });
        }
      }
      if x < width - 1 {
        let border = answer.horizontal.get(y, x);
        if border != Border::Wall {
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 2, "color": "#cccccc", "item": "wall"
          });
        }
        if border != Border::Undecided {
          let kind = if border == Border::Wall { "boldWall" } else { "cross" };
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 2, "color": "green", "item": kind
          });
        }
      }
    }
  }

  Ok(json::object! {
    "description": {
      "kind": "grid",
      "height": height,
      "width": width,
      "defaultStyle": "outer_grid",
      "data": JsonValue::Array(data)
    }
  })
}

fn solve_evolmino(url: &str) -> Result<JsonValue, Error> {
  let problem = evolmino::Problem::parse_url(url).ok_or(Error::InvalidUrl)?;
  let answer = evolmino::solve(&problem).ok_or(Error::NoAnswer)?;

  let height = problem.height();
  let width = problem.width();
  let mut data: Vec<JsonValue> = Vec::new();

  for i in 0..problem.num_arrows() {
    let arrow = problem.arrow(i);
    for j in 1..arrow.len() {
      data.push(json::object! {
        "y": arrow[j - 1].0 + arrow[j].0 + 1,
        "x": arrow[j - 1].1 + arrow[j].1 + 1,
        "color": "black",
        "item": "line"
      });
    }
  }

  for y in 0..height {
    for x in 0..width {
      match problem.cell(y, x) {
        ProblemCell::Black => {
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 1, "color": "black", "item": "fill"
          });
          continue;
        }
        ProblemCell::Square => {
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 1, "color": "black", "item": "square"
          });
          continue;
        }
        ProblemCell::Empty => {}
      }

      match answer.get(y, x) {
        Cell::Square => {
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 1, "color": "green", "item": "square"
          });
        }
        Cell::Empty => {
          data.push(json::object! {
            "y": y * 2 + 1, "x": x * 2 + 1, "color": "green", "item": "dot"
          });
        }
        Cell::Undecided => {}
      }
    }
  }

  Ok(json::object! {
    "description": {
      "kind": "grid",
      "height": height,
      "width": width,
      "defaultStyle": "grid",
      "data": JsonValue::Array(data)
    }
  })
}

/// Solve the puzzle at `url` and return the viewer JSON; parse and solve failures become
/// `{"description": "..."}` documents.
pub fn solve(url: &str) -> String {
  let result = if url.starts_with("https://puzz.link/p?dbchoco/") {
    solve_doublechoco(url)
  } else if url.starts_with("https://puzz.link/p?evolmino/") {
    solve_evolmino(url)
  } else {
    Err(Error::InvalidUrl)
  };

  match result {
    Ok(doc) => doc.dump(),
    Err(e)  => json::object! { "description": e.to_string() }.dump(),
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_urls_are_reported() {
    assert_eq!(solve("https://example.com/"), r#"{"description":"invalid url"}"#);
    assert_eq!(
      solve("https://puzz.link/p?dbchoco/2/2/"),
      r#"{"description":"invalid url"}"#
    );
  }

  #[test]
  fn unsolvable_puzzles_are_reported() {
    // 2x2 checkerboard with an impossible clue.
    assert_eq!(
      solve("https://puzz.link/p?dbchoco/2/2/c3i"),
      r#"{"description":"no answer"}"#
    );
  }

  #[test]
  fn solved_grid_has_document_shape() {
    // 1x2 dbchoco instance with the unique all-connected answer.
    let mut problem = crate::doublechoco::Problem::new(1, 2);
    problem.set_color(0, 0, 0);
    problem.set_color(0, 1, 1);
    let out = solve(&problem.url());
    let doc = json::parse(&out).unwrap();
    assert_eq!(doc["description"]["kind"], "grid");
    assert_eq!(doc["description"]["height"], 1);
    assert_eq!(doc["description"]["width"], 2);
    assert!(doc["description"]["data"].is_array());
  }

  #[test]
  fn evolmino_answer_marks_squares() {
    let mut problem = crate::evolmino::Problem::new(2, 3);
    problem.set_cell(0, 0, ProblemCell::Square);
    problem.set_cell(0, 2, ProblemCell::Square);
    problem.add_arrow(vec![(0, 0), (0, 1), (0, 2)]);
    let out = solve(&problem.url());
    let doc = json::parse(&out).unwrap();
    assert_eq!(doc["description"]["kind"], "grid");
    // The answer layer contains at least the forced empty dot at (0, 1).
    let data = &doc["description"]["data"];
    let mut found_dot = false;
    for item in data.members() {
      if item["item"] == "dot" && item["y"] == 1 && item["x"] == 3 {
        found_dot = true;
      }
    }
    assert!(found_dot);
  }
}
