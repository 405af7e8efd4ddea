//! Copyright/license header injection.
//!
//! The generated file is exactly `comment_each_line(template) + body`, so the
//! body can always be recovered by stripping the commented template again.

use crate::unit::GeneratedUnit;
use mockgen_model::{MockgenError, Result};

const COMMENT_MARKER: &str = "// ";

/// Prefix every non-empty template line with `// `; empty lines stay empty.
///
/// The result always ends with a newline unless the template is empty.
pub fn comment_each_line(template: &str) -> String {
    if template.is_empty() {
        return String::new();
    }
    let mut commented = template
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{COMMENT_MARKER}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    if !commented.ends_with('\n') {
        commented.push('\n');
    }
    commented
}

/// Attach the commented template to a unit; `None` leaves it without a header
pub fn inject_header(mut unit: GeneratedUnit, template: Option<&str>) -> GeneratedUnit {
    unit.header = template.map(comment_each_line).filter(|h| !h.is_empty());
    unit
}

/// Remove the commented template from the front of generated output
pub fn strip_header<'a>(output: &'a str, template: &str) -> Result<&'a str> {
    let prefix = comment_each_line(template);
    output
        .strip_prefix(prefix.as_str())
        .ok_or(MockgenError::HeaderMismatch {
            expected_prefix_len: prefix.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_lines_stay_blank() {
        assert_eq!(
            comment_each_line("Copyright 2020 Example\n\nLicensed under MIT\n"),
            "// Copyright 2020 Example\n\n// Licensed under MIT\n"
        );
    }

    #[test]
    fn unterminated_template_gets_newline() {
        assert_eq!(comment_each_line("one\ntwo"), "// one\n// two\n");
        assert_eq!(comment_each_line(""), "");
    }

    #[test]
    fn header_prefix_law() {
        let body = "// Code generated by MockGen. DO NOT EDIT.\npackage mock\n";
        for template in ["Line one\nLine two\n", "Line one\nLine two", "\nA\n\n", "x"] {
            let unit = inject_header(GeneratedUnit::new(body, Vec::new()), Some(template));
            let output = unit.render();
            assert_eq!(output, format!("{}{body}", comment_each_line(template)));
            assert_eq!(strip_header(&output, template).unwrap(), body);
        }
    }

    #[test]
    fn no_template_means_no_header() {
        let body = "package mock\n";
        let unit = inject_header(GeneratedUnit::new(body, Vec::new()), None);
        assert_eq!(unit.render(), body);
    }

    #[test]
    fn missing_header_is_a_mismatch() {
        let err = strip_header("package mock\n", "Copyright\n").unwrap_err();
        assert!(matches!(
            err,
            MockgenError::HeaderMismatch {
                expected_prefix_len: 13
            }
        ));
    }
}
