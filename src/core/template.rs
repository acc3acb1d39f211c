/// Substitute `{{token}}` placeholders in a template.
///
/// Every occurrence of each token is replaced; a token that never appears is
/// simply skipped.
pub fn render(template: &str, substitutions: &[(&str, String)]) -> String {
    let mut output = template.to_string();
    for (token, value) in substitutions {
        output = output.replace(&placeholder(token), value);
    }
    output
}

fn placeholder(token: &str) -> String {
    format!("{{{{{}}}}}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_single_occurrence_in_place() {
        let out = render("<body>{{tableRows}}</body>", &[("tableRows", "<tr/>".into())]);
        assert_eq!(out, "<body><tr/></body>");
        assert!(!out.contains("{{tableRows}}"));
    }

    #[test]
    fn replaces_every_occurrence() {
        let out = render(
            "{{total}} and again {{total}}",
            &[("total", "$5.00".into())],
        );
        assert_eq!(out, "$5.00 and again $5.00");
    }

    #[test]
    fn applies_multiple_tokens() {
        let out = render(
            "usd={{totalCostUSD}} inr={{totalCostINR}}",
            &[
                ("totalCostUSD", "$1.00".into()),
                ("totalCostINR", "₹83.00".into()),
            ],
        );
        assert_eq!(out, "usd=$1.00 inr=₹83.00");
    }

    #[test]
    fn absent_token_leaves_template_untouched() {
        let out = render("static text", &[("tableRows", "rows".into())]);
        assert_eq!(out, "static text");
    }
}
