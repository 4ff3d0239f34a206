//! Shared fixtures: a small lead export built in memory.
#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use rust_xlsxwriter::Workbook;

pub const HEADERS: [&str; 10] = [
    "Record ID",
    "First Name",
    "Phone Number",
    "Email",
    "Country/Region",
    "Lead Source",
    "Contact owner",
    "Lead Status",
    "Create Date",
    "Age of your Child",
];

pub enum Value {
    Text(&'static str),
    Number(f64),
    Blank,
}

use Value::{Blank, Number, Text};

/// Five leads: four created in 2023 (January, March x2, July) and one in 2022.
///
/// - 1001 and 1002 share a phone number once country codes and spaces go
/// - 1001 and 1003 share an email
/// - 1002 (2023) and 1004 (2022) have no contact owner
/// - 1005 has its create date stored as an Excel serial number
pub fn rows() -> Vec<[Value; 10]> {
    vec![
        [
            Number(1001.0),
            Text("Asha"),
            Text("+91 98765 43210"),
            Text("asha@example.com"),
            Text("India"),
            Text("Google"),
            Text("Ravi"),
            Text("New"),
            Text("2023-01-15 09:30"),
            Number(8.0),
        ],
        [
            Number(1002.0),
            Text("Ben"),
            Text("98765 43210"),
            Text("ben@example.com"),
            Text("India"),
            Blank,
            Blank,
            Text("Open"),
            Text("2023-03-02 11:00"),
            Number(15.0),
        ],
        [
            Number(1003.0),
            Text("Chen"),
            Text("555 0100"),
            Text("asha@example.com"),
            Text("Kenya"),
            Text("Referral"),
            Text("Ravi"),
            Text("New"),
            Text("2023-03-20 14:45"),
            Text("twelve"),
        ],
        [
            Number(1004.0),
            Text("Dana"),
            Blank,
            Text("dana@example.com"),
            Blank,
            Text("Google"),
            Blank,
            Text("Closed"),
            Text("2022-12-31 23:59"),
            Number(21.0),
        ],
        [
            Number(1005.0),
            Text("Eli"),
            Blank,
            Text("eli@example.com"),
            Text("United States"),
            Blank,
            Text("Mina"),
            Blank,
            Number(45108.0),
            Number(30.0),
        ],
    ]
}

pub fn leads_xlsx() -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (index, row) in rows().iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let (r, c) = (index as u32 + 1, col as u16);
                match value {
                    Text(text) => {
                        sheet.write_string(r, c, *text).unwrap();
                    }
                    Number(number) => {
                        sheet.write_number(r, c, *number).unwrap();
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

pub fn leads_csv() -> Vec<u8> {
    let mut csv = HEADERS.join(",");
    csv.push('\n');
    for row in rows() {
        let line: Vec<String> = row
            .iter()
            .map(|value| match value {
                Text(text) => format!("\"{}\"", text),
                Number(number) => number.to_string(),
                Blank => String::new(),
            })
            .collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv.into_bytes()
}

pub fn data_url(bytes: &[u8]) -> String {
    format!(
        "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,{}",
        STANDARD.encode(bytes)
    )
}
