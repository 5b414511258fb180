//! cyclic-run: executes a field-operation script and prints the result
//!
//! Loads a script (one command per line, `name = energy` creation lines
//! allowed), executes it through the interpreter, and prints per-command
//! results plus the final system state.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use cyclic_runtime::{FieldSnapshot, Interpreter, ScriptEvent, SystemSummary};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cyclic-run")]
#[command(about = "Run a cyclic field-operation script")]
struct Cli {
    /// Path to the script file
    script: PathBuf,

    /// Print only the system summary, not per-field state
    #[arg(long)]
    summary_only: bool,

    /// Emit the final state as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cyclic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.script) {
        Ok(source) => source,
        Err(e) => {
            error!("failed to read {}: {e}", cli.script.display());
            process::exit(1);
        }
    };

    let mut interp = Interpreter::new();
    let events = match interp.run_script(&source) {
        Ok(events) => events,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    if cli.json {
        print_json(&interp);
        return;
    }

    for event in &events {
        print_event(event);
    }

    println!();
    if !cli.summary_only {
        for field in interp.list_fields() {
            print_field(&field);
        }
        println!();
    }
    print_summary(&interp.summary());
}

fn print_event(event: &ScriptEvent) {
    match event {
        ScriptEvent::Created { line, field, energy } => {
            println!("[{line:>3}] created {field} with {energy} J");
        }
        ScriptEvent::Executed { line, result } => {
            let touched: Vec<String> = result.mutated.iter().map(|f| f.name.to_string()).collect();
            print!("[{line:>3}] {} on {}", result.operation, touched.join(", "));
            if !result.created.is_empty() {
                print!(", {} fields spawned", result.created.len());
            }
            if result.energy_delta.abs() > 1e-9 {
                print!(" ({:+.4} J)", result.energy_delta);
            }
            println!();
        }
    }
}

fn print_field(field: &FieldSnapshot) {
    println!("field {}", field.name);
    println!(
        "  energy     {:>12.4} J  (kinetic {:.4}, potential {:.4})",
        field.total_energy, field.kinetic, field.potential
    );
    println!("  entropy    {:>12.4}", field.entropy);
    println!("  coherence  {:>12.4}", field.coherence);
    println!(
        "  phase      {:>12}  at {:.4} rad",
        field.phase_state.to_string(),
        field.phase_angle
    );
    println!("  capacity   {:>12.4}", field.capacity);
    println!("  frequency  {:>12.2} Hz", field.frequency);
    println!("  age        {:>12}", field.age);
    if field.fractal_depth > 0 {
        println!("  depth      {:>12}", field.fractal_depth);
    }
    if let Some(partner) = &field.entangled_with {
        println!("  entangled with {partner}");
    }
}

fn print_summary(summary: &SystemSummary) {
    println!("fields         {:>12}", summary.fields);
    println!("total energy   {:>12.4} J", summary.total_energy);
    println!("total entropy  {:>12.4}", summary.total_entropy);
    println!("mean capacity  {:>12.4}", summary.mean_capacity);
    println!("mean coherence {:>12.4}", summary.mean_coherence);
}

fn print_json(interp: &Interpreter) {
    let value = serde_json::json!({
        "summary": interp.summary(),
        "fields": interp.list_fields(),
    });
    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
}
