//! HTML for the console pages. Every database value and identifier goes
//! through `html_escape` before it is written out.

use crate::libs::{EditForm, FieldValues, Record, ResultSet, TableCatalog, TableSchema, cell_text};
use crate::server::menu::Operation;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;display:flex}\
nav{width:16rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{padding:1rem 2rem;flex:1}\
label{display:block;margin-top:.6rem}\
input,select{width:100%;max-width:28rem;padding:.3rem}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .5rem}\
.notice{padding:.6rem;margin:.6rem 0;border-radius:4px}\
.success{background:#dff5e3}.info{background:#e3eefc}.error{background:#fde2e2}";

pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn render(&self) -> String {
        let (class, message) = match self {
            Notice::Success(m) => ("success", m),
            Notice::Info(m) => ("info", m),
            Notice::Error(m) => ("error", m),
        };
        format!(r#"<div class="notice {class}">{}</div>"#, text(message))
    }
}

fn document(title: &str, nav: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{STYLE}</style></head><body>{nav}<main>{content}</main></body></html>",
        text(title)
    )
}

fn sidebar(catalog: &TableCatalog, operation: Operation, table: Option<&str>) -> String {
    let operations: String = Operation::ALL
        .iter()
        .map(|op| {
            let selected = if *op == operation { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                op.slug(),
                op.label()
            )
        })
        .collect();
    let tables: String = catalog
        .names()
        .map(|name| {
            let selected = if Some(name) == table { " selected" } else { "" };
            format!(r#"<option value="{}"{selected}>{}</option>"#, attr(name), text(name))
        })
        .collect();
    format!(
        r#"<nav><form method="get" action="/navigate">
<label>Choose option:<select name="operation">{operations}</select></label>
<label>Choose a table<select name="table">{tables}</select></label>
<p><button type="submit">Go</button></p></form>
<form method="post" action="/logout"><button type="submit">Log out</button></form></nav>"#
    )
}

/// A full console page: sidebar menu plus `body` under a heading.
pub fn console_page(
    catalog: &TableCatalog,
    operation: Operation,
    table: Option<&str>,
    notices: &[Notice],
    body: &str,
) -> String {
    let heading = operation.heading(table.unwrap_or_default());
    let notices: String = notices.iter().map(Notice::render).collect();
    let content = format!(
        "<h1>Mortgage Management System</h1><h2>{}</h2>{notices}{body}",
        text(&heading)
    );
    document(
        "Mortgage Management System",
        &sidebar(catalog, operation, table),
        &content,
    )
}

pub fn home(catalog: &TableCatalog) -> String {
    console_page(catalog, Operation::Home, None, &[], "")
}

pub fn login(error: Option<&str>) -> String {
    let error = error
        .map(|e| Notice::Error(e.to_string()).render())
        .unwrap_or_default();
    document(
        "Mortgage Management System",
        "",
        &format!(
            r#"<h1>Mortgage Management System</h1>{error}
<form method="post" action="/login">
<label>Password<input type="password" name="password" autofocus></label>
<p><button type="submit">Log in</button></p></form>"#
        ),
    )
}

/// Standalone error page, used where no table context exists.
pub fn error_page(message: &str) -> String {
    document(
        "Mortgage Management System",
        "",
        &format!(
            r#"{}<p><a href="/">Back to the console</a></p>"#,
            Notice::Error(message.to_string()).render()
        ),
    )
}

fn input(column: &str, value: &str) -> String {
    format!(
        r#"<label>Enter {}<input type="text" name="{}" value="{}"></label>"#,
        text(column),
        attr(column),
        attr(value)
    )
}

fn fixed_input(label: &str, value: &str) -> String {
    format!(
        r#"<label>{}<input type="text" value="{}" disabled></label>"#,
        text(label),
        attr(value)
    )
}

/// Create form: one text input per non-key column, the key shown as
/// generated by the database.
pub fn create_form(table: &TableSchema, columns: &[String], values: &FieldValues) -> String {
    let inputs: String = columns
        .iter()
        .map(|c| input(c, values.get(c).map(String::as_str).unwrap_or_default()))
        .collect();
    format!(
        r#"<form method="post" action="{}">{}{inputs}<p><button type="submit">Create Record</button></p></form>"#,
        attr(&Operation::Create.path(&table.name)),
        fixed_input(&table.key_column, "auto-generated"),
    )
}

pub fn result_table(result: &ResultSet) -> String {
    if result.columns.is_empty() {
        return String::new();
    }
    let header: String = result
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", text(c)))
        .collect();
    let rows: String = result
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|v| format!("<td>{}</td>", text(&cell_text(v))))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(
        "<p>{} record(s)</p><table><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>",
        result.len()
    )
}

pub fn record_table(record: &Record) -> String {
    let rows: String = record
        .fields
        .iter()
        .map(|(c, v)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                text(c),
                text(&cell_text(v))
            )
        })
        .collect();
    format!("<table><tbody>{rows}</tbody></table>")
}

/// Picker over the live key values of `table`.
pub fn key_choice(operation: Operation, table: &TableSchema, keys: &[String]) -> String {
    let options: String = keys
        .iter()
        .map(|k| format!(r#"<option value="{}">{}</option>"#, attr(k), text(k)))
        .collect();
    format!(
        r#"<form method="get" action="{}"><label>Select the {} of the record to {}<select name="key">{options}</select></label>
<p><button type="submit">Continue</button></p></form>"#,
        attr(&operation.path(&table.name)),
        text(&table.key_column),
        operation.slug(),
    )
}

/// Update form with the key read-only and every other column editable.
pub fn edit_form(table: &str, form: &EditForm) -> String {
    let action = Operation::Update
        .record_path(table, &form.key)
        .unwrap_or_default();
    let inputs: String = form.fields.iter().map(|(c, v)| input(c, v)).collect();
    format!(
        r#"<form method="post" action="{}">{}{inputs}<p><button type="submit">Update Record</button></p></form>"#,
        attr(&action),
        fixed_input(&form.key_column, &form.key),
    )
}

pub fn delete_confirm(table: &str, record: &Record) -> String {
    let action = Operation::Delete
        .record_path(table, &record.key)
        .unwrap_or_default();
    format!(
        r#"{}<form method="post" action="{}"><p><button type="submit">Delete Record</button></p></form>"#,
        record_table(record),
        attr(&action)
    )
}
