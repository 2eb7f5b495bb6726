//! The `bandmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create bandmark.toml
    if std::path::Path::new("bandmark.toml").exists() {
        println!("bandmark.toml already exists, skipping.");
    } else {
        std::fs::write("bandmark.toml", SAMPLE_CONFIG)?;
        println!("Created bandmark.toml");
    }

    // Create example practice test
    std::fs::create_dir_all("practice-tests")?;
    let example_path = std::path::Path::new("practice-tests/example.toml");
    if example_path.exists() {
        println!("practice-tests/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TEST)?;
        println!("Created practice-tests/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit bandmark.toml with your store URL and API key");
    println!("  2. Run: bandmark validate --test practice-tests/example.toml");
    println!("  3. Run: bandmark score --test practice-tests/example.toml --submission <answers.toml>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bandmark configuration

[store]
type = "rest"
url = "${BANDMARK_STORE_URL}"
api_key = "${BANDMARK_STORE_KEY}"

parallelism = 4
output_dir = "./bandmark-results"
"#;

const EXAMPLE_TEST: &str = r#"[test]
id = "example"
name = "Example Reading Practice"
description = "A short true/false/not given set to get started"
skill = "reading"

[[questions]]
id = "q1"
prompt = "The library opened in 1890. (true / false / not given)"
answer = "true"

[[questions]]
id = "q2"
prompt = "Entry was always free. (true / false / not given)"
answer = "not given"

[[questions]]
id = "q3"
prompt = "The reading room seats 40 people. (true / false / not given)"
answer = "false"
"#;
