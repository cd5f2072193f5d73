//! Structured activity parsing
//!
//! Maps a retrieved chunk back into the catalog's structured form: one or
//! more activities, each with its priced work resources (`Codice:`,
//! `U.M.:`, `Euro:` fields). Callers serialize these into cost rows.

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One priced work item inside an activity
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub description: String,
    pub code: String,
    pub unit: String,
    pub price: String,
}

/// One catalog activity with its resources
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub title: String,
    pub resources: Vec<Resource>,
}

/// Parse every `Activity:` block in a chunk into structured form.
/// Chunks without any `Activity:` marker produce an empty list.
pub fn parse_activities(chunk: &str) -> Result<Vec<Activity>> {
    let code_re = Regex::new(r"Codice:\s*([^,\n]*)")?;
    let unit_re = Regex::new(r"U\.M\.:\s*([^,\n]*)")?;
    let price_re = Regex::new(r"Euro:\s*([^,\n]*)")?;

    let mut activities = Vec::new();

    for block in chunk.split("Activity:").skip(1) {
        let title = match block.find("Work:") {
            Some(pos) => block[..pos].trim().to_string(),
            None => block.trim().to_string(),
        };

        let mut resources = Vec::new();
        for work in block.split("Work:").skip(1) {
            let description = match work.find("Codice:") {
                Some(pos) => work[..pos].trim().to_string(),
                None => work.trim().to_string(),
            };
            resources.push(Resource {
                description,
                code: capture_field(&code_re, work),
                unit: capture_field(&unit_re, work),
                price: capture_field(&price_re, work),
            });
        }

        activities.push(Activity { title, resources });
    }

    Ok(activities)
}

fn capture_field(re: &Regex, text: &str) -> String {
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: &str = "Main Category: Opere edili Description: Prezziario \
        Category: Tinteggiature Activity: Tinteggiatura pareti interne \
        Work: due mani di idropittura Codice: 02.B01, U.M.: mq, Euro: 6.50 \
        Work: preparazione fondo Codice: 02.B02, U.M.: mq, Euro: 2.10";

    #[test]
    fn test_parse_single_activity_with_resources() {
        let activities = parse_activities(CHUNK).unwrap();
        assert_eq!(activities.len(), 1);

        let activity = &activities[0];
        assert_eq!(activity.title, "Tinteggiatura pareti interne");
        assert_eq!(activity.resources.len(), 2);

        assert_eq!(activity.resources[0].description, "due mani di idropittura");
        assert_eq!(activity.resources[0].code, "02.B01");
        assert_eq!(activity.resources[0].unit, "mq");
        assert_eq!(activity.resources[0].price, "6.50");

        assert_eq!(activity.resources[1].code, "02.B02");
        assert_eq!(activity.resources[1].price, "2.10");
    }

    #[test]
    fn test_parse_activity_without_work() {
        let activities = parse_activities("Activity: Solo titolo").unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].title, "Solo titolo");
        assert!(activities[0].resources.is_empty());
    }

    #[test]
    fn test_parse_chunk_without_activity_marker() {
        let activities = parse_activities("Category: Demolizioni e basta").unwrap();
        assert!(activities.is_empty());
    }

    #[test]
    fn test_parse_multiple_activities() {
        let chunk = "Activity: Prima Work: a Codice: 1, U.M.: mq, Euro: 1.00 \
            Activity: Seconda Work: b Codice: 2, U.M.: mc, Euro: 2.00";
        let activities = parse_activities(chunk).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].title, "Prima");
        assert_eq!(activities[1].title, "Seconda");
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let activities = parse_activities("Activity: T Work: descrizione senza campi").unwrap();
        let resource = &activities[0].resources[0];
        assert_eq!(resource.description, "descrizione senza campi");
        assert_eq!(resource.code, "");
        assert_eq!(resource.unit, "");
        assert_eq!(resource.price, "");
    }
}
