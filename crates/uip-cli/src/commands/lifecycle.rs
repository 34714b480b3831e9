use serde::Serialize;
use tabled::{Table, Tabled};
use uip_types::LifecycleMachine;

use crate::output::{print_structured, OutputFormat};

#[derive(Serialize, Tabled)]
struct LifecycleRow {
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "SUCCESSORS")]
    successors: String,
    #[tabled(rename = "TERMINAL")]
    terminal: bool,
}

pub fn show(format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<LifecycleRow> = LifecycleMachine::standard()
        .table()
        .into_iter()
        .map(|(state, successors)| LifecycleRow {
            state: state.to_string(),
            successors: successors
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            terminal: state.is_terminal(),
        })
        .collect();

    match format {
        OutputFormat::Text => println!("{}", Table::new(rows)),
        _ => print_structured(&rows, format)?,
    }
    Ok(())
}
