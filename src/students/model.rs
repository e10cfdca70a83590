use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{number_or_text, RecordId};

/// Highest grade level the data model accepts.
pub const MAX_STANDARD: u8 = 26;

/// Student record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    #[serde(deserialize_with = "number_or_text")]
    pub roll_number: u32,
    #[serde(deserialize_with = "number_or_text")]
    pub standard: u8,
    pub student_card_id: String,
    pub email: String,
    pub phone: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Body of create and update requests: a student without its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub name: String,
    pub roll_number: u32,
    pub standard: u8,
    pub student_card_id: String,
    pub email: String,
    pub phone: String,
}

/// Update body: the edited fields with the existing identifier merged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub id: RecordId,
    #[serde(flatten)]
    pub input: StudentInput,
}

impl Student {
    /// Fields the editor copies into its draft.
    pub fn to_input(&self) -> StudentInput {
        StudentInput {
            name: self.name.clone(),
            roll_number: self.roll_number,
            standard: self.standard,
            student_card_id: self.student_card_id.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Letter for a grade level: 1 is `A`, 26 is `Z`.
pub fn standard_letter(standard: u8) -> Option<char> {
    (1..=MAX_STANDARD)
        .contains(&standard)
        .then(|| char::from(b'A' + standard - 1))
}

/// Card id: the standard's letter followed by the roll number.
pub fn student_card_id(standard: u8, roll_number: u32) -> Option<String> {
    standard_letter(standard).map(|letter| format!("{letter}{roll_number}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_is_letter_then_roll() {
        assert_eq!(student_card_id(3, 12).as_deref(), Some("C12"));
        assert_eq!(student_card_id(5, 23).as_deref(), Some("E23"));
        assert_eq!(student_card_id(1, 1).as_deref(), Some("A1"));
        assert_eq!(student_card_id(26, 400).as_deref(), Some("Z400"));
    }

    #[test]
    fn card_id_matches_ascii_offset_for_every_standard() {
        for s in 1..=MAX_STANDARD {
            let expected = format!("{}{}", char::from(64 + s), 9);
            assert_eq!(student_card_id(s, 9), Some(expected));
        }
    }

    #[test]
    fn no_letter_outside_range() {
        assert_eq!(standard_letter(0), None);
        assert_eq!(standard_letter(27), None);
        assert_eq!(student_card_id(0, 5), None);
    }

    #[test]
    fn decodes_backend_row() {
        let json = r#"{
            "id": 17,
            "name": "Asha Rao",
            "rollNumber": "23",
            "standard": 5,
            "studentCardId": "E23",
            "email": "asha@school.in",
            "phone": "9876543210",
            "createdAt": "2024-06-01T10:00:00Z",
            "updatedAt": "2024-06-02T08:30:00.000Z"
        }"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.id.as_str(), "17");
        assert_eq!(student.roll_number, 23);
        assert_eq!(student.standard, 5);
        assert!(student.created_at.is_some());
        assert!(student.updated_at.is_some());
    }

    #[test]
    fn update_body_flattens_id_into_student_fields() {
        let body = StudentUpdate {
            id: RecordId::from("4"),
            input: StudentInput {
                name: "Ravi".into(),
                roll_number: 2,
                standard: 1,
                student_card_id: "A2".into(),
                email: "ravi@x.io".into(),
                phone: "6000000000".into(),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["id"], "4");
        assert_eq!(value["rollNumber"], 2);
        assert_eq!(value["studentCardId"], "A2");
    }
}
