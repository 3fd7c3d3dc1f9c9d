use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One company as delivered by the job board endpoint.
///
/// Nothing is validated. Every field takes whatever scalar the endpoint sends
/// and keeps its string form, a missing or `null` field is `None` and renders
/// as an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Company {
    #[serde(deserialize_with = "scalar")]
    pub name: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub headquarters_address: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub headquarters_city_state: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub description: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub industry: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub company_url: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub linkedin_url: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub logo: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub latest_funding: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub latest_funding_round: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub size: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub li_size: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub age_founded: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub glass_door: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub ceo_approvals: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub recommended: Option<String>,
}

fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(stringify(Value::deserialize(deserializer)?))
}

/// String form of a JSON value, the way it would be printed in a cell.
pub fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        // f64's Display drops the fractional part of integral values (2019.0 -> "2019").
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl Company {
    /// All fields as (label, value) pairs, in the order used by the record view.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", text(&self.name)),
            ("Description", text(&self.description)),
            ("Industry", text(&self.industry)),
            ("Address", text(&self.headquarters_address)),
            ("Location", text(&self.headquarters_city_state)),
            ("Website", text(&self.company_url)),
            ("LinkedIn", text(&self.linkedin_url)),
            ("Logo", text(&self.logo)),
            ("Latest Funding", text(&self.latest_funding)),
            ("Funding Round", text(&self.latest_funding_round)),
            ("Size", text(&self.size)),
            ("LinkedIn Size", text(&self.li_size)),
            ("Founded", text(&self.age_founded)),
            ("Glassdoor Rating", text(&self.glass_door)),
        ]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn company(name: &str, industry: &str, city: &str) -> Company {
        Company {
            name: Some(name.to_string()),
            industry: Some(industry.to_string()),
            headquarters_city_state: Some(city.to_string()),
            company_url: Some(format!("https://{}.example", name.to_lowercase())),
            linkedin_url: Some(format!("https://linkedin.example/{}", name.to_lowercase())),
            size: Some("120".to_string()),
            age_founded: Some("2015".to_string()),
            glass_door: Some("4.2".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn deserialize_full_record() {
        let json = r#"[{
            "name": "Acme",
            "headquarters_address": "1 Main St",
            "headquarters_city_state": "Austin, TX",
            "description": "Rockets",
            "industry": "Aerospace",
            "company_url": "https://acme.example",
            "linkedin_url": "https://linkedin.example/acme",
            "logo": "https://acme.example/logo.png",
            "latest_funding": "$10M",
            "latest_funding_round": "Series A",
            "size": 51,
            "li_size": "51-200",
            "age_founded": 2019,
            "glass_door": 4.5,
            "ceo_approvals": 0.9,
            "recommended": 0.85
        }]"#;
        let companies: Vec<Company> = serde_json::from_str(json).unwrap();
        assert_eq!(companies.len(), 1);
        let acme = &companies[0];
        assert_eq!(acme.name.as_deref(), Some("Acme"));
        assert_eq!(acme.size.as_deref(), Some("51"));
        assert_eq!(acme.glass_door.as_deref(), Some("4.5"));
        assert_eq!(acme.ceo_approvals.as_deref(), Some("0.9"));
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let json = r#"[{"name": "Ghost", "logo": null}]"#;
        let companies: Vec<Company> = serde_json::from_str(json).unwrap();
        assert_eq!(companies[0].logo, None);
        assert_eq!(companies[0].size, None);
        assert_eq!(text(&companies[0].industry), "");
    }

    #[test]
    fn fields_of_unexpected_type_keep_the_record() {
        let json = r#"[
            {"name": "Good", "size": 10},
            {"name": "Odd", "size": "51-200", "li_size": 200, "glass_door": "n/a", "industry": true}
        ]"#;
        let companies: Vec<Company> = serde_json::from_str(json).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].size.as_deref(), Some("10"));
        assert_eq!(companies[1].size.as_deref(), Some("51-200"));
        assert_eq!(companies[1].li_size.as_deref(), Some("200"));
        assert_eq!(companies[1].glass_door.as_deref(), Some("n/a"));
        assert_eq!(companies[1].industry.as_deref(), Some("true"));
    }

    #[test]
    fn numbers_stringify_like_json() {
        assert_eq!(stringify(serde_json::json!(2019)).as_deref(), Some("2019"));
        assert_eq!(stringify(serde_json::json!(2019.0)).as_deref(), Some("2019"));
        assert_eq!(stringify(serde_json::json!(4.5)).as_deref(), Some("4.5"));
        assert_eq!(stringify(serde_json::json!(-3)).as_deref(), Some("-3"));
        assert_eq!(stringify(serde_json::Value::Null), None);
    }

    #[test]
    fn record_fields_skip_percentages() {
        let c = company("Acme", "Fintech", "Berlin");
        let labels: Vec<&str> = c.fields().iter().map(|(l, _)| *l).collect();
        assert!(labels.contains(&"Glassdoor Rating"));
        assert!(!labels.iter().any(|l| l.contains("CEO")));
    }
}
