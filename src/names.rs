use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEGMENT_SEPARATOR_RE: Regex = Regex::new(r"\W+").unwrap();
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn segments(name: &str) -> impl Iterator<Item = &str> {
    SEGMENT_SEPARATOR_RE
        .split(name)
        .filter(|segment| !segment.is_empty())
}

/// `foo-bar` -> `FooBar`. Used for the generated class name.
pub fn to_upper_camel_case(name: &str) -> String {
    segments(name).map(capitalize).collect()
}

/// `foo-bar` -> `fooBar`. The first segment is kept as written.
pub fn to_lower_camel_case(name: &str) -> String {
    let mut segments = segments(name);
    let mut result = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        result.push_str(&capitalize(segment));
    }
    result
}
