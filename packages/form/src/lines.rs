//! Blank-line removal and fixed-window slicing of raw page lines.

use crate::FormError;
use crate::layout::LineWindow;

/// Drops empty and whitespace-only lines, then keeps exactly the lines in
/// `window`.
///
/// # Errors
///
/// Returns [`FormError::Structure`] if fewer than
/// [`LineWindow::required_lines`] non-blank lines exist.
pub fn clean_lines<S: AsRef<str>>(
    lines: &[S],
    window: LineWindow,
) -> Result<Vec<String>, FormError> {
    let non_blank: Vec<&str> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .collect();

    let required = window.required_lines();
    if non_blank.len() < required {
        return Err(FormError::Structure {
            found: non_blank.len(),
            required,
        });
    }

    log::debug!(
        "Keeping lines {}..{required} of {} non-blank lines",
        window.first_line,
        non_blank.len()
    );

    Ok(non_blank[window.first_line..required]
        .iter()
        .map(|&line| line.to_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: LineWindow = LineWindow {
        first_line: 4,
        line_count: 8,
    };

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn keeps_fifth_through_twelfth_non_blank_lines() {
        let mut raw = Vec::new();
        for line in numbered(14) {
            raw.push(line);
            raw.push("   ".to_owned());
            raw.push(String::new());
        }

        let kept = clean_lines(&raw, WINDOW).unwrap();
        assert_eq!(kept.as_slice(), &numbered(12)[4..12]);
    }

    #[test]
    fn exactly_twelve_lines_is_enough() {
        let kept = clean_lines(&numbered(12), WINDOW).unwrap();
        assert_eq!(kept.len(), 8);
        assert_eq!(kept[0], "line 4");
        assert_eq!(kept[7], "line 11");
    }

    #[test]
    fn fewer_than_twelve_non_blank_lines_is_structure_error() {
        let mut raw = numbered(11);
        raw.push("\t".to_owned());
        raw.push(String::new());

        let err = clean_lines(&raw, WINDOW).unwrap_err();
        assert!(
            matches!(
                err,
                FormError::Structure {
                    found: 11,
                    required: 12
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn idempotent_on_clean_input() {
        let once = clean_lines(&numbered(12), WINDOW).unwrap();

        let mut padded: Vec<String> = numbered(4);
        padded.extend(once.iter().cloned());
        let twice = clean_lines(&padded, WINDOW).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_surrounding_whitespace_on_kept_lines() {
        let mut raw = numbered(12);
        raw[4] = "  padded  ".to_owned();
        let kept = clean_lines(&raw, WINDOW).unwrap();
        assert_eq!(kept[0], "  padded  ");
    }
}
