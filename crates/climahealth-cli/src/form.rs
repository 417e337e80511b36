//! The one-field city form.

/// What the user asked for on one prompt line.
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    City(String),
    Quit,
}

/// Blank input submits the default city.
pub fn parse(line: &str, default_city: &str) -> Submission {
    let input = line.trim();
    if input.is_empty() {
        return Submission::City(default_city.to_string());
    }
    if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
        return Submission::Quit;
    }
    Submission::City(input.to_string())
}

pub fn prompt(default_city: &str) -> String {
    format!("🌆 Enter City Name [{}]: ", default_city)
}
