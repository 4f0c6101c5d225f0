use serde::Serialize;
use std::fmt::Write;
use utoipa::ToSchema;

pub const VCARD_MIME: &str = "text/vcard";

const CRLF: &str = "\r\n";

/// The business contact card offered for download.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ContactCard {
    pub name: String,
    pub title: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub linkedin: String,
}

impl ContactCard {
    pub fn locimo() -> Self {
        Self {
            name: "Ange KANGA".into(),
            title: "Gérante".into(),
            company: "Locimo Services".into(),
            phone: "+33669352128".into(),
            email: "contact@locimoservices.fr".into(),
            website: "locimoservices.fr".into(),
            linkedin: "https://linkedin.com/in/ange-audrey-kanga".into(),
        }
    }

    /// vCard 3.0 text, CRLF terminated lines.
    pub fn to_vcard(&self) -> String {
        let lines = [
            ("BEGIN", "VCARD".to_string()),
            ("VERSION", "3.0".to_string()),
            ("FN", escape(&self.name)),
            ("TITLE", escape(&self.title)),
            ("ORG", escape(&self.company)),
            ("TEL;TYPE=WORK,VOICE", self.phone.clone()),
            ("EMAIL;TYPE=WORK", self.email.clone()),
            ("URL", self.website.clone()),
            ("X-SOCIALPROFILE;TYPE=linkedin", self.linkedin.clone()),
            ("END", "VCARD".to_string()),
        ];

        lines.iter().fold(String::new(), |mut card, (property, value)| {
            // writing into a String cannot fail
            let _ = write!(card, "{property}:{value}{CRLF}");
            card
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.vcf", self.name)
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_lines_are_in_order() {
        let card = ContactCard::locimo().to_vcard();

        let lines: Vec<_> = card.split_terminator(CRLF).collect();
        assert_eq!(
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "FN:Ange KANGA",
                "TITLE:Gérante",
                "ORG:Locimo Services",
                "TEL;TYPE=WORK,VOICE:+33669352128",
                "EMAIL;TYPE=WORK:contact@locimoservices.fr",
                "URL:locimoservices.fr",
                "X-SOCIALPROFILE;TYPE=linkedin:https://linkedin.com/in/ange-audrey-kanga",
                "END:VCARD",
            ],
            lines
        );
        assert!(card.ends_with("END:VCARD\r\n"));
        assert!(!card.replace(CRLF, "").contains('\n'));
    }

    #[test]
    fn text_values_are_escaped() {
        let card = ContactCard {
            company: "Dupont, Fils; et Cie".into(),
            title: "Gérante\nAssociée".into(),
            ..ContactCard::locimo()
        };

        let text = card.to_vcard();

        assert!(text.contains("ORG:Dupont\\, Fils\\; et Cie\r\n"));
        assert!(text.contains("TITLE:Gérante\\nAssociée\r\n"));
    }

    #[test]
    fn file_name_uses_contact_name() {
        assert_eq!("Ange KANGA.vcf", ContactCard::locimo().file_name());
    }
}
