//! The `surveyrules init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("surveyrules.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("assessments")?;
    write_if_missing(Path::new("assessments/example.toml"), EXAMPLE_ASSESSMENT)?;

    std::fs::create_dir_all("responses")?;
    write_if_missing(Path::new("responses/example.toml"), EXAMPLE_RESPONSES)?;

    println!("\nNext steps:");
    println!("  1. Run: surveyrules validate --assessment assessments/example.toml");
    println!("  2. Run: surveyrules expand --assessment assessments/example.toml");
    println!(
        "  3. Run: surveyrules evaluate --assessment assessments/example.toml --responses responses/example.toml"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# surveyrules configuration

# text or json
default_format = "text"
# decimal places for computed values in text output
precision = 2
# make `validate` exit non-zero on warnings
fail_on_warnings = false
"#;

const EXAMPLE_ASSESSMENT: &str = r#"[assessment]
id = "example"
name = "Example Assessment"
description = "A small assessment to get started"

# q2 is hidden when q1 is answered "no"
[contingencies.q2]
disabling_answer_values = { q1 = "no" }

# q3 inherits q2's rule and is also shown only once q2 is complete
[contingencies.q3]
enabling_questions = ["q2"]
disabling_answer_values = { q2 = "n/a" }

[[goals]]
master_question = "q1"
answer_value = "yes"
mode = "enables"
questions = ["q4", "q5"]

[formulas.subtotal]
op = "+"
left = "q4"
right = "q5"

[formulas.score]
op = "/"
left = "subtotal"
right = "max_score"
"#;

const EXAMPLE_RESPONSES: &str = r#"[responses.q1]
value_percentage = 100
answers = ["yes"]

[responses.q2]
value_percentage = 100
answers = ["partly"]

[values]
q4 = 6.0
q5 = 2.0
max_score = 10.0
"#;
