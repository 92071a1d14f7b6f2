//! Quote-aware line splitting.
//!
//! Spreadsheet exports wrap cells containing the delimiter in double quotes.
//! Quoting is handled permissively: every `"` toggles the quoted state and is
//! dropped from the output, so unbalanced quotes never fail.

/// Split a comma-separated line.
pub fn tokenize(line: &str) -> Vec<String> {
    tokenize_with(line, ',')
}

/// Split `line` on `delimiter`, ignoring delimiters inside quoted spans.
/// Every emitted field is trimmed.
pub fn tokenize_with(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Field at `index`, or `""` when the row is shorter.
pub fn cell(fields: &[String], index: usize) -> &str {
    fields.get(index).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quoted_comma() {
        assert_eq!(tokenize(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_tokenize_matches_naive_split_without_quotes() {
        let lines = [
            "Cliente,,,Acme Corp",
            "  Mesas , 4 ,  , ",
            "",
            "solo",
            ",,,",
        ];
        for line in lines {
            let naive: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();
            assert_eq!(tokenize(line), naive, "line: {:?}", line);
        }
    }

    #[test]
    fn test_tokenize_trims_inside_quotes() {
        assert_eq!(tokenize(r#"" Ana , Pere ",x"#), vec!["Ana , Pere", "x"]);
    }

    #[test]
    fn test_tokenize_unbalanced_quote_does_not_fail() {
        assert_eq!(tokenize(r#"a,"b,c"#), vec!["a", "b,c"]);
    }

    #[test]
    fn test_tokenize_with_semicolon() {
        assert_eq!(tokenize_with("Fecha;20/05/2025;x,y", ';'), vec!["Fecha", "20/05/2025", "x,y"]);
    }

    #[test]
    fn test_tokenize_with_tab() {
        assert_eq!(tokenize_with("a\t\"b\tc\"\td", '\t'), vec!["a", "b\tc", "d"]);
    }

    #[test]
    fn test_cell_out_of_range() {
        let fields = tokenize("a,b");
        assert_eq!(cell(&fields, 1), "b");
        assert_eq!(cell(&fields, 6), "");
    }
}
