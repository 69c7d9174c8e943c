use serde::Deserialize;

/// Contact form body; `comment-text` matches the textarea's form name.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(rename = "comment-text")]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_field_maps_from_its_form_name() {
        let form: ContactForm = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "comment-text": "hello"
        }))
        .expect("deserializes");
        assert_eq!(form.comment, "hello");
    }
}
