mod common;

use std::fs;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::str::contains;

const PRODUCTS: &str = "ID\tPrice\tName\n1\t19.99\tPen\n2\t29.99\tO'Neil Pad\n";

fn bin() -> Command {
    Command::cargo_bin("copy-as-insert").expect("binary exists")
}

#[test]
fn convert_writes_script_to_stdout() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    bin()
        .args(["convert", "-i", input.to_str().unwrap(), "-t", "Products", "--temporary"])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE [#Products]"))
        .stdout(contains("[Price] DECIMAL(18,4) NULL"))
        .stdout(contains(
            "INSERT INTO [#Products] ([ID], [Price], [Name]) VALUES \
             (1, 19.99, 'Pen'), (2, 29.99, 'O''Neil Pad');",
        ));
}

#[test]
fn convert_writes_output_file() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    let output = workspace.path().join("products.sql");
    bin()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "Products",
            "-o",
            output.to_str().unwrap(),
            "--schema",
            "sales",
            "--temporal",
            "--temporal-suffix",
        ])
        .assert()
        .success();
    let sql = fs::read_to_string(&output).expect("read output");
    assert!(sql.starts_with("CREATE TABLE [sales].[Products_Temporal]"));
    assert!(sql.contains("HISTORY_TABLE = [sales].[Products_History]"));
    assert!(sql.ends_with(";\n"));
}

#[test]
fn convert_reads_stdin() {
    bin()
        .args(["convert", "-i", "-", "-t", "Rates"])
        .write_stdin("Rate\n0,0673\n1,5\n")
        .assert()
        .success()
        .stdout(contains("[Rate] DECIMAL(18,4)"))
        .stdout(contains("VALUES (0.0673), (1.5);"));
}

#[test]
fn reserved_table_name_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    bin()
        .args(["convert", "-i", input.to_str().unwrap(), "-t", "select"])
        .assert()
        .failure()
        .stderr(contains("reserved SQL keyword"));
}

#[test]
fn type_override_and_identity_key() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    bin()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "Products",
            "--identity-pk",
            "--type",
            "price=text",
        ])
        .assert()
        .success()
        .stdout(contains("[ID] INT IDENTITY(1,1) NOT NULL PRIMARY KEY"))
        .stdout(contains("[Price] NVARCHAR(5) NULL"))
        .stdout(contains("([Price], [Name]) VALUES ('19.99', 'Pen')"));
}

#[test]
fn unknown_override_column_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    bin()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "Products",
            "--type",
            "Missing=int",
        ])
        .assert()
        .failure()
        .stderr(contains("Unknown column 'Missing'"));
}

#[test]
fn settings_file_supplies_defaults() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("flags.csv", "Code,Active\nA,yes\nB,no\n");
    let config = workspace.write(
        "settings.yml",
        "default_schema: staging\ndetect_bit_columns: true\n",
    );
    bin()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "Flags",
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE [staging].[Flags]"))
        .stdout(contains("[Active] BIT NULL"))
        .stdout(contains("VALUES ('A', 1), ('B', 0);"));
}

#[test]
fn probe_prints_schema_table() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    bin()
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("ID *"))
        .stdout(contains("float"))
        .stdout(contains("3 column(s), 2 row(s), source ClipboardTSV"));
}

#[test]
fn probe_emits_json() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    let output = bin()
        .args(["probe", "-i", input.to_str().unwrap(), "--format", "json"])
        .output()
        .expect("run probe");
    assert!(output.status.success());
    let columns: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(columns[0]["name"], "ID");
    assert_eq!(columns[0]["sql_type"], "Int");
    assert_eq!(columns[0]["is_primary_key"], true);
    assert_eq!(columns[1]["sql_type"], "Float");
    assert_eq!(columns[2]["max_length"], 10);
}

#[test]
fn empty_input_is_reported() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("empty.tsv", "");
    bin()
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Input is empty"));
}

#[test]
fn quick_mode_writes_untyped_temporary_table() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("products.tsv", PRODUCTS);
    let output = bin()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "Products",
            "--quick",
            "--temporal",
            "--temporal-suffix",
        ])
        .output()
        .expect("run convert");
    assert!(output.status.success());
    let sql = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(sql.starts_with(
        "CREATE TABLE [#Products]\n(\n    [ID] NVARCHAR(100) NULL,\n    \
         [Price] NVARCHAR(100) NULL,\n    [Name] NVARCHAR(100) NULL\n);"
    ));
    assert!(!sql.contains("SYSTEM_VERSIONING"));
    assert!(!sql.contains("_Temporal"));
    assert!(sql.contains("VALUES ('1', '19.99', 'Pen'), ('2', '29.99', 'O''Neil Pad');"));
}
