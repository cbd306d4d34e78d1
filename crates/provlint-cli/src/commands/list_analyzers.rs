//! List analyzers command implementation.

use provlint_passes::all_analyzers;

/// Runs the list-analyzers command.
pub fn run() {
    println!("Available analyzers:\n");
    println!("{:<15} Description", "Name");
    println!("{}", "-".repeat(70));

    for analyzer in all_analyzers() {
        println!("{:<15} {}", analyzer.name, analyzer.doc);
    }

    println!("\nRequirements:");
    for analyzer in all_analyzers() {
        if analyzer.requires.is_empty() {
            continue;
        }
        let requires: Vec<&str> = analyzer.requires.iter().map(|a| a.name).collect();
        println!("  {:<13} requires {}", analyzer.name, requires.join(", "));
    }
}
