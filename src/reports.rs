//! Derived views over a period-filtered lead table.
//!
//! Every function here is independent of the others: it reads the table it is
//! given and returns a fresh report.

use crate::errors::AppError;
use crate::models::{
    Cell, LeadTable, CHILD_AGE, CONTACT_OWNER, COUNTRY, EMAIL, LEAD_SOURCE, LEAD_STATUS,
    PHONE_NUMBER, RECORD_ID, SERIAL_NUMBER,
};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

// ============ Leads Table ============

/// Column metadata for table widgets.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// `Record ID` and `SNo` stay; every other column may be removed client-side.
    pub deletable: bool,
    pub hideable: bool,
}

impl ColumnSpec {
    fn for_column(name: &str) -> Self {
        let locked = name == RECORD_ID || name == SERIAL_NUMBER;
        Self {
            name: name.to_string(),
            deletable: !locked,
            hideable: true,
        }
    }
}

/// One page of the filtered table.
#[derive(Debug, Clone, Serialize)]
pub struct LeadsTablePage {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Cell>>,
    /// Zero based.
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

pub fn leads_table(table: &LeadTable, page: usize, page_size: usize) -> LeadsTablePage {
    let page_size = page_size.max(1);
    let total_rows = table.len();
    let total_pages = total_rows.div_ceil(page_size);

    let rows = table
        .rows
        .iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .map(|row| row.cells.clone())
        .collect();

    LeadsTablePage {
        columns: table.columns.iter().map(|c| ColumnSpec::for_column(c)).collect(),
        rows,
        page,
        page_size,
        total_rows,
        total_pages,
    }
}

// ============ Duplicates ============

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKey {
    Phone,
    Email,
}

impl DuplicateKey {
    fn column(self) -> &'static str {
        match self {
            DuplicateKey::Phone => PHONE_NUMBER,
            DuplicateKey::Email => EMAIL,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRecord {
    pub matched_on: DuplicateKey,
    /// The shared phone number or email.
    pub value: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicatesReport {
    pub columns: Vec<String>,
    pub phone_matches: usize,
    pub email_matches: usize,
    /// Phone matches first, then email matches; a row can appear in both.
    pub records: Vec<DuplicateRecord>,
}

/// Every occurrence of a phone number or email that appears more than once.
pub fn duplicate_records(table: &LeadTable) -> DuplicatesReport {
    let phone = duplicates_on(table, DuplicateKey::Phone);
    let email = duplicates_on(table, DuplicateKey::Email);

    DuplicatesReport {
        columns: table.columns.clone(),
        phone_matches: phone.len(),
        email_matches: email.len(),
        records: phone.into_iter().chain(email).collect(),
    }
}

fn duplicates_on(table: &LeadTable, key: DuplicateKey) -> Vec<DuplicateRecord> {
    let values: Vec<Option<String>> = table
        .rows
        .iter()
        .map(|row| table.cell(row, key.column()).as_text())
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *occurrences.entry(value.as_str()).or_default() += 1;
    }

    table
        .rows
        .iter()
        .zip(values.iter())
        .filter_map(|(row, value)| {
            let value = value.as_ref()?;
            (occurrences.get(value.as_str()).copied().unwrap_or(0) > 1).then(|| DuplicateRecord {
                matched_on: key,
                value: value.clone(),
                cells: row.cells.clone(),
            })
        })
        .collect()
}

// ============ Missing Contact Owner ============

#[derive(Debug, Clone, Serialize)]
pub struct MissingOwnerReport {
    pub columns: Vec<String>,
    pub count: usize,
    pub rows: Vec<Vec<Cell>>,
}

/// Rows with no `Contact owner`, as a table of their own.
pub fn missing_contact_owner_table(table: &LeadTable) -> LeadTable {
    table.retain_rows(|row| table.cell(row, CONTACT_OWNER).is_missing())
}

pub fn missing_contact_owner(table: &LeadTable) -> MissingOwnerReport {
    let missing = missing_contact_owner_table(table);
    MissingOwnerReport {
        columns: missing.columns,
        count: missing.rows.len(),
        rows: missing.rows.into_iter().map(|row| row.cells).collect(),
    }
}

// ============ Distributions ============

/// Categorical columns that get a pie chart and a missing-value count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Country,
    LeadSource,
    ContactOwner,
    LeadStatus,
}

impl CategoryField {
    pub const ALL: [CategoryField; 4] = [
        CategoryField::Country,
        CategoryField::LeadSource,
        CategoryField::ContactOwner,
        CategoryField::LeadStatus,
    ];

    pub fn column(self) -> &'static str {
        match self {
            CategoryField::Country => COUNTRY,
            CategoryField::LeadSource => LEAD_SOURCE,
            CategoryField::ContactOwner => CONTACT_OWNER,
            CategoryField::LeadStatus => LEAD_STATUS,
        }
    }

    /// Human name used in titles and missing-count labels.
    pub fn display_name(self) -> &'static str {
        match self {
            CategoryField::Country => "Country",
            CategoryField::LeadSource => "Lead Source",
            CategoryField::ContactOwner => "Contact Owner",
            CategoryField::LeadStatus => "Lead Status",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CategoryField::Country => "country",
            CategoryField::LeadSource => "lead-source",
            CategoryField::ContactOwner => "contact-owner",
            CategoryField::LeadStatus => "lead-status",
        }
    }
}

impl FromStr for CategoryField {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        CategoryField::ALL
            .into_iter()
            .find(|field| field.slug() == raw)
            .ok_or_else(|| AppError::NotFound(format!("Unknown distribution '{}'", raw)))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Lead counts per value, most frequent first.
#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub field: String,
    pub counts: Vec<CategoryCount>,
    /// Rows without a usable value for `field`.
    pub missing: usize,
    /// e.g. `Missing Country Data Count: 3`
    pub missing_label: String,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn count_of(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map_or(0, |c| c.count)
    }
}

/// Sorts by count descending; ties keep the order values were first seen.
fn count_values<I>(values: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push(CategoryCount {
                    label: value,
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn category_distribution(table: &LeadTable, field: CategoryField) -> Distribution {
    let values: Vec<Option<String>> = table
        .rows
        .iter()
        .map(|row| table.cell(row, field.column()).as_text())
        .collect();
    let missing = values.iter().filter(|v| v.is_none()).count();

    Distribution {
        field: field.column().to_string(),
        counts: count_values(values.into_iter().flatten()),
        missing,
        missing_label: format!("Missing {} Data Count: {}", field.display_name(), missing),
    }
}

/// Per-country counts keyed by country name, for the choropleth.
pub fn country_map(table: &LeadTable) -> Distribution {
    category_distribution(table, CategoryField::Country)
}

/// Leads per calendar month of `Create Date`, by full English month name.
pub fn month_distribution(table: &LeadTable) -> Distribution {
    let months = table
        .rows
        .iter()
        .filter_map(|row| row.created_at)
        .map(|created| created.format("%B").to_string());
    let missing = table.rows.iter().filter(|row| row.created_at.is_none()).count();

    Distribution {
        field: "Month".to_string(),
        counts: count_values(months),
        missing,
        missing_label: format!("Missing Create Date Data Count: {}", missing),
    }
}

/// Age buckets for `Age of your Child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgeGroup {
    UpToTen,
    ElevenToNineteen,
    TwentyToTwentyTwo,
    OverTwentyTwo,
    Inconsistent,
}

impl AgeGroup {
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::UpToTen => "Ages <= 10",
            AgeGroup::ElevenToNineteen => "11 <= Ages <= 19",
            AgeGroup::TwentyToTwentyTwo => "20 <= Ages <= 22",
            AgeGroup::OverTwentyTwo => "Age > 22",
            AgeGroup::Inconsistent => "Inconsistent",
        }
    }

    /// Non-numeric, missing and negative ages are inconsistent.
    // Fractional ages fall into the next closed range (10.5 is 11-19), where a
    // strict integer match would have sent them to `Age > 22`.
    pub fn classify(cell: &Cell) -> AgeGroup {
        match cell.as_f64() {
            None => AgeGroup::Inconsistent,
            Some(age) if age < 0.0 => AgeGroup::Inconsistent,
            Some(age) if age <= 10.0 => AgeGroup::UpToTen,
            Some(age) if age <= 19.0 => AgeGroup::ElevenToNineteen,
            Some(age) if age <= 22.0 => AgeGroup::TwentyToTwentyTwo,
            Some(_) => AgeGroup::OverTwentyTwo,
        }
    }
}

pub fn age_distribution(table: &LeadTable) -> Distribution {
    let groups: Vec<AgeGroup> = table
        .rows
        .iter()
        .map(|row| AgeGroup::classify(table.cell(row, CHILD_AGE)))
        .collect();
    let inconsistent = groups
        .iter()
        .filter(|group| **group == AgeGroup::Inconsistent)
        .count();

    Distribution {
        field: "Age Group".to_string(),
        counts: count_values(groups.into_iter().map(|group| group.label().to_string())),
        missing: inconsistent,
        missing_label: format!("Inconsistent Age Values Count: {}", inconsistent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadRow;

    fn text(value: &str) -> Cell {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    fn table(rows: &[(&str, &str, &str, &str, &str)]) -> LeadTable {
        let mut table = LeadTable::new(vec![
            SERIAL_NUMBER.to_string(),
            RECORD_ID.to_string(),
            PHONE_NUMBER.to_string(),
            EMAIL.to_string(),
            COUNTRY.to_string(),
            CHILD_AGE.to_string(),
        ]);
        for (i, (id, phone, email, country, age)) in rows.iter().enumerate() {
            table.rows.push(LeadRow::new(vec![
                Cell::Int(i as i64 + 1),
                text(id),
                text(phone),
                text(email),
                text(country),
                text(age),
            ]));
        }
        table
    }

    #[test]
    fn duplicates_keep_every_occurrence_and_skip_missing() {
        let table = table(&[
            ("1", "9876543210", "a@example.com", "India", "5"),
            ("2", "9876543210", "b@example.com", "India", "5"),
            ("3", "", "a@example.com", "India", "5"),
            ("4", "", "", "India", "5"),
            ("5", "", "", "India", "5"),
        ]);
        let report = duplicate_records(&table);
        assert_eq!(report.phone_matches, 2);
        assert_eq!(report.email_matches, 2);
        assert_eq!(report.records[0].matched_on, DuplicateKey::Phone);
        assert_eq!(report.records[2].matched_on, DuplicateKey::Email);
        assert_eq!(report.records[2].value, "a@example.com");
        assert_eq!(report.records[3].cells[1], Cell::Text("3".into()));
    }

    #[test]
    fn emails_differing_only_in_case_are_distinct() {
        let table = table(&[
            ("1", "", "Ann@x.com", "India", "5"),
            ("2", "", "ann@x.com", "India", "5"),
        ]);
        let report = duplicate_records(&table);
        assert_eq!(report.email_matches, 0);
        assert!(report.records.is_empty());
    }

    #[test]
    fn country_counts_sorted_with_missing_label() {
        let table = table(&[
            ("1", "", "", "India", ""),
            ("2", "", "", "Kenya", ""),
            ("3", "", "", "Kenya", ""),
            ("4", "", "", "", ""),
        ]);
        let dist = category_distribution(&table, CategoryField::Country);
        assert_eq!(dist.counts[0], CategoryCount { label: "Kenya".into(), count: 2 });
        assert_eq!(dist.count_of("India"), 1);
        assert_eq!(dist.missing, 1);
        assert_eq!(dist.missing_label, "Missing Country Data Count: 1");
        assert_eq!(dist.total() + dist.missing, table.len());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let counts = count_values(["b", "a", "a", "b", "c"].iter().map(|s| s.to_string()));
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn absent_owner_column_means_every_row_is_missing() {
        let table = table(&[("1", "", "", "", ""), ("2", "", "", "", "")]);
        let report = missing_contact_owner(&table);
        assert_eq!(report.count, 2);
        let dist = category_distribution(&table, CategoryField::ContactOwner);
        assert!(dist.counts.is_empty());
        assert_eq!(dist.missing_label, "Missing Contact Owner Data Count: 2");
    }

    #[test]
    fn age_buckets() {
        let cases = [
            ("3", AgeGroup::UpToTen),
            ("10", AgeGroup::UpToTen),
            ("10.5", AgeGroup::ElevenToNineteen),
            ("19", AgeGroup::ElevenToNineteen),
            ("21", AgeGroup::TwentyToTwentyTwo),
            ("23", AgeGroup::OverTwentyTwo),
            ("eight", AgeGroup::Inconsistent),
            ("-1", AgeGroup::Inconsistent),
            ("", AgeGroup::Inconsistent),
        ];
        for (raw, expected) in cases {
            assert_eq!(AgeGroup::classify(&text(raw)), expected, "age {:?}", raw);
        }
    }

    #[test]
    fn age_distribution_reports_inconsistent_values() {
        let table = table(&[
            ("1", "", "", "", "4"),
            ("2", "", "", "", "n/a"),
            ("3", "", "", "", "12"),
        ]);
        let dist = age_distribution(&table);
        assert_eq!(dist.missing, 1);
        assert_eq!(dist.count_of("Inconsistent"), 1);
        assert_eq!(dist.count_of("Ages <= 10"), 1);
    }

    #[test]
    fn pages_are_zero_based() {
        let table = table(&[
            ("1", "", "", "", ""),
            ("2", "", "", "", ""),
            ("3", "", "", "", ""),
        ]);
        let page = leads_table(&table, 1, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0][1], Cell::Text("3".into()));
        assert!(!page.columns[0].deletable);
        assert!(!page.columns[1].deletable);
        assert!(page.columns[2].deletable);
    }

    #[test]
    fn unknown_field_slug_is_not_found() {
        assert_eq!("lead-status".parse::<CategoryField>().unwrap(), CategoryField::LeadStatus);
        assert!(matches!("age".parse::<CategoryField>(), Err(AppError::NotFound(_))));
    }
}
