//! Metadata table command handlers.

use super::commands::{MetadataCommands, OutputFormat, Table};
use super::output::{emit, or_dash, rule};
use cyclelog::{CyclelogResult, LogQuery, Machine, Operator, Supervisor};

/// Handle `cyclelog metadata ...`.
pub async fn handle_metadata_command(
    query: &LogQuery,
    cmd: MetadataCommands,
    format: OutputFormat,
) -> CyclelogResult<()> {
    match cmd {
        MetadataCommands::List { table } => list_table(query, table, format).await,

        MetadataCommands::AddMachine { id, code } => {
            query.add_metadata(Machine::new(id, code)).await?;
            println!("Added machine {}", id);
            Ok(())
        }

        MetadataCommands::AddOperator { id, name, badge } => {
            query.add_metadata(Operator::new(id, name, badge)).await?;
            println!("Added operator {}", id);
            Ok(())
        }

        MetadataCommands::AddSupervisor { id, name, badge } => {
            query.add_metadata(Supervisor::new(id, name, badge)).await?;
            println!("Added supervisor {}", id);
            Ok(())
        }

        MetadataCommands::Delete { table, id } => {
            match table {
                Table::Machines => {
                    query.delete_metadata::<Machine>(id).await?;
                }
                Table::Operators => {
                    query.delete_metadata::<Operator>(id).await?;
                }
                Table::Supervisors => {
                    query.delete_metadata::<Supervisor>(id).await?;
                }
            }
            println!("Deleted {:?} row {}", table, id);
            Ok(())
        }
    }
}

async fn list_table(query: &LogQuery, table: Table, format: OutputFormat) -> CyclelogResult<()> {
    match table {
        Table::Machines => {
            let rows: Vec<Machine> = query.list_metadata().await?;
            emit(format, rows.as_slice(), |rows| {
                println!("{:<8} {:<20}", "id", "code");
                rule();
                for m in rows {
                    println!("{:<8} {:<20}", m.machine_id, m.code);
                }
            })
        }
        Table::Operators => {
            let rows: Vec<Operator> = query.list_metadata().await?;
            emit(format, rows.as_slice(), |rows| {
                println!("{:<8} {:<24} {:<12}", "id", "name", "badge");
                rule();
                for o in rows {
                    println!("{:<8} {:<24} {:<12}", o.operator_id, o.name, or_dash(o.badge.as_ref()));
                }
            })
        }
        Table::Supervisors => {
            let rows: Vec<Supervisor> = query.list_metadata().await?;
            emit(format, rows.as_slice(), |rows| {
                println!("{:<8} {:<24} {:<12}", "id", "name", "badge");
                rule();
                for s in rows {
                    println!(
                        "{:<8} {:<24} {:<12}",
                        s.supervisor_id,
                        s.supervisor_name,
                        or_dash(s.badge.as_ref())
                    );
                }
            })
        }
    }
}
