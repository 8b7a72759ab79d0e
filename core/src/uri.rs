//! URI template expansion.
//!
//! Supports the `{name}` form only: variables are substituted from an ordered
//! parameter list, unknown variables expand to nothing, and an unclosed brace
//! is kept literal. A template that is itself an absolute `http(s)` URL
//! replaces the base URL entirely; anything else is joined to it with a
//! single slash.

/// Expands `template` against `base_url` using `params` as the variable
/// source. The first parameter with a matching name wins.
pub fn expand(base_url: &str, template: &str, params: &[(String, String)]) -> String {
    let expanded = expand_template(template, params);
    if expanded.starts_with("http://") || expanded.starts_with("https://") {
        return expanded;
    }
    let base = base_url.trim_end_matches('/');
    let path = expanded.trim_start_matches('/');
    format!("{base}/{path}")
}

fn expand_template(template: &str, params: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start..].find('}') {
            Some(end) => {
                let name = &rest[start + 1..start + end];
                if let Some((_, value)) = params.iter().find(|(k, _)| k == name) {
                    out.push_str(value);
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
