use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::model::{student_card_id, Student, StudentInput, MAX_STANDARD};
use crate::id::RecordId;

pub const MAX_NAME_LEN: usize = 256;
pub const PHONE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    RollNumber,
    Standard,
    Email,
    Phone,
}

/// Per-field messages from the last submit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }
}

/// The editor's form fields as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub roll_number: String,
    pub standard: String,
    pub student_card_id: String,
    pub email: String,
    pub phone: String,
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Keystroke filter for the phone input: digits only, at most ten.
pub fn accepts_phone_input(text: &str) -> bool {
    text.len() <= PHONE_LEN && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_standard(text: &str) -> Option<u8> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|s| (1..=MAX_STANDARD).contains(s))
}

fn parse_roll_number(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|r| *r > 0)
}

/// Card id for the draft's current standard and roll number, if both hold
/// usable values.
pub fn derive_card_id(standard: &str, roll_number: &str) -> Option<String> {
    student_card_id(parse_standard(standard)?, parse_roll_number(roll_number)?)
}

/// Checks every rule and, when all pass, produces the request body.
pub fn validate_draft(draft: &StudentDraft) -> Result<StudentInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, "Name is required.");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.insert(Field::Name, "Name must be less than 256 characters.");
    }

    let roll_number = parse_roll_number(&draft.roll_number);
    if roll_number.is_none() {
        errors.insert(Field::RollNumber, "Roll number must be a positive whole number.");
    }

    let standard = parse_standard(&draft.standard);
    if standard.is_none() {
        errors.insert(Field::Standard, "Standard must be between 1 and 26.");
    }

    if !is_valid_email(&draft.email) {
        errors.insert(Field::Email, "Invalid email address.");
    }

    if !is_valid_phone(&draft.phone) {
        errors.insert(
            Field::Phone,
            "Phone must be a valid 10-digit number starting with 6–9.",
        );
    }

    match (standard, roll_number) {
        (Some(standard), Some(roll_number)) if errors.is_empty() => Ok(StudentInput {
            name: name.to_string(),
            roll_number,
            standard,
            student_card_id: student_card_id(standard, roll_number).unwrap_or_default(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
        }),
        _ => Err(errors),
    }
}

/// Modal form for creating one student or editing an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentEditor {
    target: Option<RecordId>,
    draft: StudentDraft,
    errors: ValidationErrors,
}

impl StudentEditor {
    pub fn create() -> Self {
        Self::default()
    }

    /// Prefills the draft from `student`. The card id is re-derived right
    /// away, so a stored value that disagrees with standard/roll is replaced.
    pub fn edit(student: &Student) -> Self {
        let mut editor = Self {
            target: Some(student.id.clone()),
            draft: StudentDraft {
                name: student.name.clone(),
                roll_number: student.roll_number.to_string(),
                standard: student.standard.to_string(),
                student_card_id: student.student_card_id.clone(),
                email: student.email.clone(),
                phone: student.phone.clone(),
            },
            errors: ValidationErrors::default(),
        };
        editor.rederive();
        editor
    }

    pub fn target(&self) -> Option<&RecordId> {
        self.target.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Student"
        } else {
            "Add New Student"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Student"
        } else {
            "Create Student"
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_roll_number(&mut self, roll_number: impl Into<String>) {
        self.draft.roll_number = roll_number.into();
        self.rederive();
    }

    pub fn set_standard(&mut self, standard: impl Into<String>) {
        self.draft.standard = standard.into();
        self.rederive();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    /// Applies a phone keystroke; returns false (and keeps the old value)
    /// for anything but up to ten digits.
    pub fn input_phone(&mut self, text: &str) -> bool {
        if !accepts_phone_input(text) {
            return false;
        }
        self.draft.phone = text.to_string();
        true
    }

    // Only when both sources hold values; clearing one leaves the last id.
    fn rederive(&mut self) {
        if self.draft.standard.trim().is_empty() || self.draft.roll_number.trim().is_empty() {
            return;
        }
        self.draft.student_card_id =
            derive_card_id(&self.draft.standard, &self.draft.roll_number).unwrap_or_default();
    }

    /// Runs the rules on a submit attempt and records the per-field errors.
    pub fn validate(&mut self) -> Result<StudentInput, ValidationErrors> {
        self.rederive();
        let result = validate_draft(&self.draft);
        self.errors = match &result {
            Ok(_) => ValidationErrors::default(),
            Err(errors) => errors.clone(),
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> StudentDraft {
        StudentDraft {
            name: "Asha Rao".into(),
            roll_number: "23".into(),
            standard: "5".into(),
            student_card_id: String::new(),
            email: "asha@school.in".into(),
            phone: "9876543210".into(),
        }
    }

    fn error_fields(draft: &StudentDraft) -> Vec<Field> {
        match validate_draft(draft) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.fields().collect(),
        }
    }

    #[test]
    fn valid_draft_produces_input_with_derived_card_id() {
        let input = validate_draft(&valid_draft()).unwrap();
        assert_eq!(input.student_card_id, "E23");
        assert_eq!(input.roll_number, 23);
        assert_eq!(input.standard, 5);
    }

    #[test]
    fn name_rules() {
        let mut d = valid_draft();
        d.name = String::new();
        assert_eq!(error_fields(&d), [Field::Name]);

        d.name = "x".repeat(257);
        assert_eq!(error_fields(&d), [Field::Name]);

        d.name = "x".repeat(256);
        assert!(error_fields(&d).is_empty());
    }

    #[test]
    fn email_rules() {
        let mut d = valid_draft();
        d.email = "bad".into();
        assert_eq!(error_fields(&d), [Field::Email]);

        d.email = "a@b.co".into();
        assert!(error_fields(&d).is_empty());

        d.email = "a@b.c".into();
        assert_eq!(error_fields(&d), [Field::Email]);
    }

    #[test]
    fn phone_rules() {
        let mut d = valid_draft();
        d.phone = "12345".into();
        assert_eq!(error_fields(&d), [Field::Phone]);

        d.phone = "5123456789".into();
        assert_eq!(error_fields(&d), [Field::Phone]);

        d.phone = "6123456789".into();
        assert!(error_fields(&d).is_empty());
    }

    #[test]
    fn standard_rules() {
        let mut d = valid_draft();
        for bad in ["0", "27", "", "five"] {
            d.standard = bad.into();
            assert_eq!(error_fields(&d), [Field::Standard], "standard {bad:?}");
        }
        for good in ["1", "26"] {
            d.standard = good.into();
            assert!(error_fields(&d).is_empty(), "standard {good:?}");
        }
    }

    #[test]
    fn roll_number_must_be_positive() {
        let mut d = valid_draft();
        d.roll_number = "0".into();
        assert_eq!(error_fields(&d), [Field::RollNumber]);
        d.roll_number = "-4".into();
        assert_eq!(error_fields(&d), [Field::RollNumber]);
    }

    #[test]
    fn several_failures_are_reported_together() {
        let d = StudentDraft::default();
        let fields = error_fields(&d);
        assert_eq!(
            fields,
            [
                Field::Name,
                Field::RollNumber,
                Field::Standard,
                Field::Email,
                Field::Phone
            ]
        );
    }

    #[test]
    fn card_id_follows_either_source_field() {
        let mut editor = StudentEditor::create();
        editor.set_standard("3");
        assert_eq!(editor.draft().student_card_id, "");
        editor.set_roll_number("12");
        assert_eq!(editor.draft().student_card_id, "C12");
        editor.set_standard("4");
        assert_eq!(editor.draft().student_card_id, "D12");
        editor.set_roll_number("7");
        assert_eq!(editor.draft().student_card_id, "D7");

        // clearing a source keeps the last derived value
        editor.set_roll_number("");
        assert_eq!(editor.draft().student_card_id, "D7");
    }

    #[test]
    fn editing_rederives_over_the_stored_card_id() {
        let student = Student {
            id: RecordId::from("1"),
            name: "Old".into(),
            roll_number: 12,
            standard: 3,
            student_card_id: "LEGACY-9".into(),
            email: "old@school.in".into(),
            phone: "7000000000".into(),
            created_at: None,
            updated_at: None,
        };
        let editor = StudentEditor::edit(&student);
        assert!(editor.is_editing());
        assert_eq!(editor.title(), "Edit Student");
        assert_eq!(editor.draft().student_card_id, "C12");
    }

    #[test]
    fn phone_keystrokes_are_filtered() {
        let mut editor = StudentEditor::create();
        assert!(editor.input_phone("98765"));
        assert!(!editor.input_phone("98765a"));
        assert!(!editor.input_phone("98765432101"));
        assert_eq!(editor.draft().phone, "98765");
    }

    #[test]
    fn validate_records_errors_and_clears_them() {
        let mut editor = StudentEditor::create();
        assert!(editor.validate().is_err());
        assert!(editor.errors().has(Field::Name));

        editor.set_name("Asha");
        editor.set_roll_number("23");
        editor.set_standard("5");
        editor.set_email("asha@school.in");
        editor.input_phone("9876543210");
        let input = editor.validate().unwrap();
        assert!(editor.errors().is_empty());
        assert_eq!(input.student_card_id, "E23");
    }
}
