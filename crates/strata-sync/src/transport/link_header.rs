//! `Link` header parsing (RFC 8288), enough to read `rel="type"` entries.

/// Targets of every link whose `rel` includes `relation`, in header order.
pub fn targets_with_rel<'a, I>(values: I, relation: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for value in values {
        for link in split_links(value) {
            let Some((target, params)) = parse_link(link) else {
                continue;
            };
            let matches = params.iter().any(|(name, value)| {
                name.eq_ignore_ascii_case("rel")
                    && value.split_whitespace().any(|r| r.eq_ignore_ascii_case(relation))
            });
            if matches && !out.iter().any(|t| t == target) {
                out.push(target.to_string());
            }
        }
    }
    out
}

/// Split a header value on commas outside `<...>` and quoted strings.
fn split_links(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_angle = false;
    let mut in_quote = false;
    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quote => in_angle = true,
            '>' if !in_quote => in_angle = false,
            '"' if !in_angle => in_quote = !in_quote,
            ',' if !in_angle && !in_quote => {
                parts.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn parse_link(link: &str) -> Option<(&str, Vec<(&str, &str)>)> {
    let link = link.trim();
    let rest = link.strip_prefix('<')?;
    let close = rest.find('>')?;
    let target = rest[..close].trim();
    let params = rest[close + 1..]
        .split(';')
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            Some((name.trim(), value.trim().trim_matches('"')))
        })
        .collect();
    Some((target, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_type_links_across_headers() {
        let headers = [
            r#"<http://www.w3.org/ns/ldp#Container>; rel="type", <http://www.w3.org/ns/ldp#Resource>;rel="type""#,
            r#"<http://localhost:8080/rest/a/fcr:acl>; rel="acl""#,
            r#"<http://www.w3.org/ns/ldp#Container>; rel="type""#,
        ];
        let types = targets_with_rel(headers, "type");
        assert_eq!(
            types,
            vec![
                "http://www.w3.org/ns/ldp#Container".to_string(),
                "http://www.w3.org/ns/ldp#Resource".to_string(),
            ]
        );
    }

    #[test]
    fn commas_inside_targets_do_not_split() {
        let headers = [r#"<http://x/a,b>; rel="type describedby""#];
        assert_eq!(targets_with_rel(headers, "type"), vec!["http://x/a,b".to_string()]);
        assert_eq!(targets_with_rel(headers, "describedby").len(), 1);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let headers = ["garbage; rel=type", r#"<http://x/t>; rel=type"#];
        assert_eq!(targets_with_rel(headers, "type"), vec!["http://x/t".to_string()]);
    }
}
