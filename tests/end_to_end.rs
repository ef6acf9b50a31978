use rust_xlsxwriter::{Workbook, XlsxError};
use sheet_flattener::{
    convert, export, flatten_sheets, Cell, ConversionError, Criteria, ExportFormat, Level, Options, ProcessingEvent,
    RawSheet,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn ev_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("EV Market")?;
    worksheet.write_string(0, 0, "EV Market, By Region, 2021-2034 (USD Billion)")?;
    worksheet.write_string(2, 0, "Segment")?;
    worksheet.write_string(2, 1, "2021")?;
    worksheet.write_string(2, 2, "2024")?;
    worksheet.write_string(3, 0, "North America")?;
    worksheet.write_string(3, 1, "120.50")?;
    worksheet.write_string(3, 2, "210.75")?;
    worksheet.write_string(4, 0, "Germany")?;
    worksheet.write_number(4, 1, 40.0)?;
    worksheet.write_number(4, 2, 55.25)?;
    worksheet.write_string(5, 0, "Total")?;
    worksheet.write_number(5, 1, 160.5)?;
    worksheet.write_number(5, 2, 266.0)?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Notes")?;
    worksheet.write_string(0, 0, "Source: industry interviews")?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Battery")?;
    worksheet.write_string(0, 0, "Battery Market by Chemistry (USD Million)")?;
    worksheet.write_string(1, 0, "Chemistry")?;
    worksheet.write_number(1, 1, 2023.0)?;
    worksheet.write_number(1, 2, 2030.0)?;
    worksheet.write_string(2, 0, "Lithium-ion")?;
    worksheet.write_number(2, 1, 10.0)?;
    worksheet.write_number(2, 2, 20.0)?;
    worksheet.write_string(3, 0, "Solid State")?;
    worksheet.write_number(3, 1, 1.0)?;
    worksheet.write_number(3, 2, 4.0)?;

    workbook.save_to_buffer()
}

#[test]
fn regional_row_from_workbook() -> TestResult {
    let bytes = ev_workbook()?;
    let result = convert(&bytes, "ev.xlsx", bytes.len() as u64, &Options::default())?;

    let row = result.rows.iter().find(|row| row.product == "North America").ok_or("missing regional row")?;
    assert_eq!(row.id, "EV Market_1");
    assert_eq!(row.title, "EV Market, By Region, 2021-2034 (USD Billion)");
    assert_eq!(row.segments, "Region");
    assert_eq!(row.units, "(USD Billion)");
    assert_eq!(row.regions, "North America");
    assert_eq!(row.level, Level::Regional);
    assert_eq!(row.field("2021"), "120.50");
    assert_eq!(row.field("2024"), "210.75");
    assert_eq!(row.cagr, "20.48");
    assert_eq!(row.source_sheet, "EV Market");
    assert_eq!(row.source_row, 3);
    Ok(())
}

#[test]
fn whole_workbook_summary_and_log() -> TestResult {
    let bytes = ev_workbook()?;
    let result = convert(&bytes, "ev.xlsx", 1234, &Options::default())?;

    let products: Vec<&str> = result.rows.iter().map(|row| row.product.as_str()).collect();
    assert_eq!(products, vec!["North America", "Germany", "Lithium-ion", "Solid State"]);
    let ids: Vec<&str> = result.rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["EV Market_1", "EV Market_2", "Battery_3", "Battery_4"]);

    let germany = &result.rows[1];
    assert_eq!(germany.level, Level::Country);
    assert_eq!(germany.country, "Germany");
    assert_eq!(germany.regions, "Europe");
    assert_eq!(germany.field("2024"), "55.25");

    let battery = &result.rows[2];
    assert_eq!(battery.segments, "Chemistry");
    assert_eq!(battery.units, "(USD Million)");
    assert_eq!(battery.level, Level::Segment);
    assert_eq!(battery.field("2030"), "20.00");
    assert_eq!(battery.field("2021"), "");

    assert_eq!(result.summary.total_rows, 4);
    assert_eq!(result.summary.count_per_level.get(&Level::Segment), Some(&2));
    assert_eq!(result.summary.columns, vec![
        "Title", "Regions", "Country", "Segments", "Units", "Product", "2021", "2023", "2024", "2030", "CAGR"
    ]);

    assert_eq!(result.log.first(), Some(&ProcessingEvent::WorkbookOpened {
        file_name: "ev.xlsx".into(),
        declared_size: 1234,
        sheets: 3,
    }));
    assert!(result.log.contains(&ProcessingEvent::EmptySheet { sheet: "Notes".into() }));
    assert!(result.log.contains(&ProcessingEvent::RowsRejected { sheet: "EV Market".into(), count: 1 }));
    assert_eq!(result.log.last().map(ToString::to_string).as_deref(), Some("Total rows: 4"));
    Ok(())
}

#[test]
fn sheet_patterns_select_sheets() -> TestResult {
    let bytes = ev_workbook()?;
    let options = Options {
        criteria: Criteria { sheet_name_patterns: Some(vec![glob::Pattern::new("Bat*")?]), ..Criteria::default() },
        ..Options::default()
    };
    let result = convert(&bytes, "ev.xlsx", bytes.len() as u64, &options)?;
    assert!(result.rows.iter().all(|row| row.source_sheet == "Battery"));
    assert_eq!(result.rows.len(), 2);
    Ok(())
}

#[test]
fn plain_text_is_fatal() {
    let bytes = b"Segment,2021,2024\nNorth America,120.50,210.75\n";
    match convert(bytes, "market.xlsx", bytes.len() as u64, &Options::default()) {
        Err(ConversionError::Parse { file_name, message }) => {
            assert_eq!(file_name, "market.xlsx");
            assert!(!message.is_empty());
        }
        Ok(result) => panic!("plain text produced {} rows", result.rows.len()),
    }
}

#[test]
fn stray_far_cell_is_fatal() -> TestResult {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Segment")?;
    worksheet.write_number(1_048_575, 16_383, 1.0)?;
    let bytes = workbook.save_to_buffer()?;
    match convert(&bytes, "stray.xlsx", bytes.len() as u64, &Options::default()) {
        Err(ConversionError::Parse { message, .. }) => assert!(message.contains("1048576 rows by 16384 columns")),
        Ok(result) => panic!("oversized sheet produced {} rows", result.rows.len()),
    }
    Ok(())
}

#[test]
fn by_region_sheet_name() {
    let sheet = RawSheet::new("EV Market, By Region, 2021-2034 (USD Billion)", vec![
        vec![Cell::text("Segment"), Cell::text("2021"), Cell::text("2024")],
        vec![Cell::text("North America"), Cell::text("120.50"), Cell::text("210.75")],
    ]);
    let result = flatten_sheets(&[sheet], &Options::default());
    assert_eq!(result.rows.len(), 1);
    let row = &result.rows[0];
    assert_eq!(
        (row.segments.as_str(), row.product.as_str(), row.units.as_str(), row.regions.as_str()),
        ("Region", "North America", "(USD Billion)", "North America")
    );
    assert_eq!(row.level, Level::Regional);
    assert_eq!(row.cagr, "20.48");
}

#[test]
fn stacked_tables_with_different_years() -> TestResult {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Data")?;
    let tables: [(u32, &str, [f64; 2]); 2] = [(0, "Passenger Cars", [2021.0, 2022.0]), (6, "Buses", [2030.0, 2031.0])];
    for (start, product, years) in tables {
        worksheet.write_string(start, 0, "Vehicle")?;
        worksheet.write_number(start, 1, years[0])?;
        worksheet.write_number(start, 2, years[1])?;
        worksheet.write_string(start + 1, 0, product)?;
        worksheet.write_number(start + 1, 1, 100.0)?;
        worksheet.write_number(start + 1, 2, 110.0)?;
    }
    let bytes = workbook.save_to_buffer()?;

    let result = convert(&bytes, "vehicles.xlsx", bytes.len() as u64, &Options::default())?;
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0].field("2022"), "110.00");
    assert_eq!(result.rows[1].field("2031"), "110.00");
    assert_eq!(result.rows[1].cagr, "10.00");
    let detected = result.log.iter().filter(|event| matches!(event, ProcessingEvent::TableDetected { .. })).count();
    assert_eq!(detected, 2);
    Ok(())
}

#[test]
fn every_format_exports() -> TestResult {
    let bytes = ev_workbook()?;
    let result = convert(&bytes, "ev.xlsx", bytes.len() as u64, &Options::default())?;
    for format in [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Json] {
        assert!(!export(&result, format)?.is_empty());
    }
    Ok(())
}
