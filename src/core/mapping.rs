//! Spreadsheet column → XForm element mapping for the DAFI enrollment form.
//!
//! The whole form is described by one ordered table. Element order inside every
//! group is part of the contract with the receiving form and must not change.

use crate::core::{Document, Group, Leaf, Record};
use serde_json::Value;

/// Text written for a missing or null cell.
pub const NULL_PLACEHOLDER: &str = "None";

pub const ORX_NAMESPACE: &str = "http://openrosa.org/xforms";
pub const JR_NAMESPACE: &str = "http://openrosa.org/javarosa";

pub const DEGREE_LEVELS: [&str; 4] = ["BA", "MA", "AA", "AS"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub leaf: String,
    pub column: String,
}

impl FieldMapping {
    fn new(leaf: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            leaf: leaf.into(),
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMapping {
    pub name: String,
    pub fields: Vec<FieldMapping>,
}

impl GroupMapping {
    fn from_pairs(name: &str, pairs: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            fields: pairs
                .iter()
                .map(|(leaf, column)| FieldMapping::new(*leaf, *column))
                .collect(),
        }
    }

    /// BA/MA/AA/AS share one layout, only the prefix differs.
    fn degree(level: &str) -> Self {
        Self {
            name: format!("group_{}", level),
            fields: vec![
                FieldMapping::new(
                    format!("{}_Medical_Non_Medical_study", level),
                    format!("{} Medical or Non-medical", level),
                ),
                FieldMapping::new(
                    format!("{}_Name_of_Higher_Education", level),
                    format!("{} Name of Higher _Education Institution", level),
                ),
                FieldMapping::new(
                    format!("{}_University_Type", level),
                    format!("{} University Type", level),
                ),
                FieldMapping::new(
                    format!("{}_Actual_Degree_Name", level),
                    format!("{} Actual Degree Name", level),
                ),
                FieldMapping::new(
                    format!("{}_Field_Of_Study_Full_Name", level),
                    format!("{} Field Of Study (Full Name)", level),
                ),
                FieldMapping::new(
                    format!("{}_Year_Selected_for_DAFI", level),
                    format!("{} Year Selected for DAFI scholarship", level),
                ),
            ],
        }
    }
}

const TOP_LEVEL: &[(&str, &str)] = &[("start", "start"), ("end", "end")];

const INFO: &[(&str, &str)] = &[
    ("Student_Code_Unique_identifier", "Student Code Unique Identifier"),
    ("PDA_Code", "Partner (PDA) Code"),
    ("proGres_Number", "ProGres Number"),
    ("First_Name", "First Name/s _(as on official documents)"),
    ("Surname_Name", "Surname Name/s _(as on official documents)"),
    ("Family_Code", "Family Code_"),
    ("other_document", "Other Document Number"),
    ("Father_s_Name", "Father's Name"),
    ("Gender", "Gender"),
    ("Year_of_Birth", "Year of Birth"),
    ("Country_of_Origin", "Country of Origin raw"),
    ("Region_of_Origin", "Region of Origin"),
    (
        "Location_Type_Where_from_CODES_tab",
        "Location Type_(Where student lives) _(from 'CODES' tab)",
    ),
];

const ACADEMIC: &[(&str, &str)] = &[
    ("Year_Selected_for_DAFI_scholar", "Year Selected for DAFI scholarship"),
    ("Year_of_entering_the_university", "Year of entering the university"),
    ("Month_of_entering_the_university", "Month of entering the university"),
    ("Expected_Year_of_Graduation_DAFI", "Expected Date of Graduation from DAFI"),
    (
        "Expected_Month_of_Gr_tion_from_UNIVERSITY",
        "Expected Month of Graduation from UNIVERSITY",
    ),
    ("Graduation_Year_DAFI", "Expected Year of Graduation from UNIVERSITY"),
    ("Academic_Status_Full_Name", "Academic Status (Full Name)"),
    ("Current_Partnership_Agreement", "Current Partnership Agreement"),
    (
        "Scholarship_Status_e_from_CODES_tab",
        "Scholarship Status _(Active/ Inactive)_(from 'CODES' tab)",
    ),
    ("Field_Of_Study_Full_Name", "Field Of Study (Full Name)"),
    ("Actual_Degree_Name", "Actual Degree Name"),
    ("Degree_Type_University_Level_or_TVET", "Degree Type_(University Level or TVET)"),
    ("Total_Number_of_Semesters", "Total Number of Semesters"),
    ("Past_Degree_types_in_Dafi", "Past Degree types in Dafi"),
    ("Total_GPA", "Total GPA"),
];

const CONTACT: &[(&str, &str)] = &[
    ("Province", "Province"),
    ("Phone_Numbers", "Phone Number"),
    ("Email_Address", "EMAIL"),
    ("address", "ADDRESS"),
    ("Comment_Level_1", "Comment- Level 1"),
    ("Comment_Level_2", "Comment- Level 2"),
];

/// Ordered mapping table for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSchema {
    pub top_level: Vec<FieldMapping>,
    pub groups: Vec<GroupMapping>,
}

impl SubmissionSchema {
    /// DAFI scholar enrollment form.
    pub fn dafi() -> Self {
        let mut groups = vec![
            GroupMapping::from_pairs("group_Info", INFO),
            GroupMapping::from_pairs("group_Academic", ACADEMIC),
        ];
        groups.extend(DEGREE_LEVELS.iter().map(|level| GroupMapping::degree(level)));
        groups.push(GroupMapping::from_pairs("group_contact", CONTACT));

        Self {
            top_level: TOP_LEVEL
                .iter()
                .map(|(leaf, column)| FieldMapping::new(*leaf, *column))
                .collect(),
            groups,
        }
    }

    /// Every source column the schema reads, in document order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.top_level
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.fields.iter()))
            .map(|f| f.column.as_str())
    }

    /// Schema columns that are absent from `headers`.
    pub fn missing_columns<'a>(&'a self, headers: &[String]) -> Vec<&'a str> {
        self.columns()
            .filter(|column| !headers.iter().any(|h| h == column))
            .collect()
    }
}

impl Default for SubmissionSchema {
    fn default() -> Self {
        Self::dafi()
    }
}

/// 轉成 XML 文字；缺值一律寫成 placeholder
pub fn stringify_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NULL_PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn map_fields(fields: &[FieldMapping], record: &Record) -> Vec<Leaf> {
    fields
        .iter()
        .map(|field| Leaf {
            name: field.leaf.clone(),
            text: stringify_value(record.get(&field.column)),
        })
        .collect()
}

/// Build the submission document for one row.
pub fn map_record(schema: &SubmissionSchema, record: &Record, project_id: &str) -> Document {
    Document {
        id: project_id.to_string(),
        namespaces: vec![
            ("xmlns:orx".to_string(), ORX_NAMESPACE.to_string()),
            ("xmlns:jr".to_string(), JR_NAMESPACE.to_string()),
        ],
        top_level: map_fields(&schema.top_level, record),
        groups: schema
            .groups
            .iter()
            .map(|group| Group {
                name: group.name.clone(),
                leaves: map_fields(&group.fields, record),
            })
            .collect(),
        instance_id: project_id.to_string(),
    }
}
