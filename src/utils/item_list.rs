use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Longest title the item tables store.
pub const TITLE_MAX_CHARS: usize = 200;

/// Items that can be built from a bare line of text.
pub trait FromTitle {
    fn from_title(title: String) -> Self;
    fn title(&self) -> &str;
    fn title_mut(&mut self) -> &mut String;
}

/// A list field as submitted: structured JSON or one title per line.
#[derive(Debug, PartialEq)]
pub enum ItemList<T> {
    Structured(Vec<T>),
    Lines(Vec<String>),
}

pub fn non_blank_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// One JSON element as an item. Elements whose fields don't fit the item
/// type keep just their title; elements without one are dropped.
fn item_from_value<T: DeserializeOwned + FromTitle>(value: Value) -> Option<T> {
    let title = match &value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("title").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    match serde_json::from_value::<T>(value) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!(error = %e, "List item has unusable fields, keeping its title");
            title.map(T::from_title)
        }
    }
}

fn clip_title(title: &mut String) {
    let trimmed = title.trim();
    *title = match trimmed.char_indices().nth(TITLE_MAX_CHARS) {
        Some((end, _)) => trimmed[..end].trim_end().to_string(),
        None => trimmed.to_string(),
    };
}

impl<T: DeserializeOwned + FromTitle> ItemList<T> {
    /// Text that opens with `[` or `{` and parses as JSON is structured; any
    /// other text is split into lines.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('[') || raw.starts_with('{') {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(values)) => {
                    return ItemList::Structured(
                        values.into_iter().filter_map(item_from_value).collect(),
                    );
                }
                Ok(value) => {
                    return ItemList::Structured(item_from_value(value).into_iter().collect());
                }
                Err(e) => debug!(error = %e, "List is not valid JSON, reading it as lines"),
            }
        }
        ItemList::Lines(non_blank_lines(raw))
    }

    /// Items with a usable title, in submission order. Titles are trimmed
    /// and clipped to `TITLE_MAX_CHARS`.
    pub fn into_items(self) -> Vec<T> {
        let items: Vec<T> = match self {
            ItemList::Structured(items) => items,
            ItemList::Lines(lines) => lines.into_iter().map(T::from_title).collect(),
        };

        items
            .into_iter()
            .filter_map(|mut item| {
                clip_title(item.title_mut());
                (!item.title().is_empty()).then_some(item)
            })
            .collect()
    }
}

/// JSON-only lists (status updates). Malformed input reads as empty.
pub fn parse_json_list<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        debug!(error = %e, "Ignoring malformed update list");
        Vec::new()
    })
}

/// Minutes given as a number or numeric string. Negative, fractional
/// overflow or non-numeric input reads as unknown.
pub fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let minutes = Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    });
    Ok(minutes.and_then(|m| u32::try_from(m).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        #[serde(default)]
        title: String,
        #[serde(default)]
        priority: u8,
        #[serde(default, deserialize_with = "lenient_minutes")]
        minutes: Option<u32>,
    }

    impl FromTitle for Item {
        fn from_title(title: String) -> Self {
            Item { title, priority: 2, minutes: None }
        }

        fn title(&self) -> &str {
            &self.title
        }

        fn title_mut(&mut self) -> &mut String {
            &mut self.title
        }
    }

    fn item(title: &str, priority: u8) -> Item {
        Item { title: title.into(), priority, minutes: None }
    }

    #[test]
    fn json_array_is_structured() {
        let list = ItemList::<Item>::parse(r#"[{"title":"Fix login","priority":3}]"#);
        assert_eq!(list, ItemList::Structured(vec![item("Fix login", 3)]));
    }

    #[test]
    fn single_json_object_is_one_item() {
        let items = ItemList::<Item>::parse(r#"{"title":"Deploy"}"#).into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Deploy");
    }

    #[test]
    fn plain_text_is_split_per_line() {
        let items = ItemList::<Item>::parse("Review PR\n\n  Standup  \n").into_items();
        assert_eq!(items, vec![item("Review PR", 2), item("Standup", 2)]);
    }

    #[test]
    fn broken_json_falls_back_to_lines() {
        let list = ItemList::<Item>::parse("[{\"title\": \"half\"\nsecond");
        assert_eq!(
            list,
            ItemList::Lines(vec!["[{\"title\": \"half\"".into(), "second".into()])
        );
    }

    #[test]
    fn one_bad_field_keeps_the_rest_of_the_array() {
        // priority 300 overflows u8
        let items = ItemList::<Item>::parse(
            r#"[{"title":"Fix login","priority":300},{"title":"Review","priority":1}]"#,
        )
        .into_items();
        assert_eq!(items, vec![item("Fix login", 2), item("Review", 1)]);
    }

    #[test]
    fn bare_strings_in_an_array_are_titles() {
        let items = ItemList::<Item>::parse(r#"["Standup", 42, "Deploy"]"#).into_items();
        assert_eq!(items, vec![item("Standup", 2), item("Deploy", 2)]);
    }

    #[test]
    fn untitled_json_items_are_dropped() {
        let items = ItemList::<Item>::parse(r#"[{"priority":1},{"title":"  "}]"#).into_items();
        assert!(items.is_empty());
    }

    #[test]
    fn long_titles_are_clipped() {
        let long = "x".repeat(TITLE_MAX_CHARS + 50);
        let items = ItemList::<Item>::parse(&long).into_items();
        assert_eq!(items[0].title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn minutes_accept_numbers_and_numeric_strings() {
        let items = ItemList::<Item>::parse(
            r#"[{"title":"a","minutes":30},{"title":"b","minutes":"45"},{"title":"c","minutes":-5},{"title":"d","minutes":"soon"}]"#,
        )
        .into_items();
        let minutes: Vec<_> = items.iter().map(|i| i.minutes).collect();
        assert_eq!(minutes, vec![Some(30), Some(45), None, None]);
    }

    #[test]
    fn malformed_update_list_is_empty() {
        let parsed: Vec<Item> = parse_json_list("[{oops");
        assert!(parsed.is_empty());
        let parsed: Vec<Item> = parse_json_list("");
        assert!(parsed.is_empty());
    }
}
