use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use promptstore::cli::{Cli, Command};
use promptstore::config::Config;
use promptstore::editor::TextEditor;
use promptstore::messages::{Background, INSERT_TEMPLATE_COMMAND, Message, handle_page_message};
use promptstore::{EXPORT_FILE_NAME, PromptTemplate, TemplateDraft, TemplateStore, placeholder};

fn setup_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
    Ok(())
}

fn print_template(template: &PromptTemplate) {
    let category = template
        .category()
        .map(|c| format!(" [{}]", c).dimmed().to_string())
        .unwrap_or_default();
    println!("{}  {}{}", template.id.yellow(), template.title.bold(), category);
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("promptstore starting");

    let store = TemplateStore::open(&config.store_path, config.default_options())
        .context("Failed to open template store")?
        .with_max_retries(config.max_retries);

    if config.seed_on_first_run && !matches!(cli.command, Command::Init) {
        let seeded = store.seed_defaults().context("Failed to seed default templates")?;
        if seeded > 0 {
            info!(seeded, "Seeded starter templates");
        }
    }

    match cli.command {
        Command::Init => {
            let seeded = store.seed_defaults().context("Failed to seed default templates")?;
            if seeded > 0 {
                println!("{} Added {} starter templates", "✓".green(), seeded);
            } else {
                println!("Store already initialized");
            }
        }
        Command::List { category } => {
            let templates: Vec<PromptTemplate> = store
                .list()?
                .into_iter()
                .filter(|t| category.as_deref().is_none_or(|c| t.category() == Some(c)))
                .collect();
            if templates.is_empty() {
                println!("No templates found");
            } else {
                for template in &templates {
                    print_template(template);
                }
            }
        }
        Command::Show { id } => {
            let template = store.get(&id)?.ok_or_else(|| eyre!("Template not found: {}", id))?;
            print_template(&template);
            let names = placeholder::extract_placeholders(&template.content);
            if !names.is_empty() {
                println!("Placeholders: {}", names.join(", ").cyan());
            }
            println!();
            println!("{}", template.content);
        }
        Command::Add {
            title,
            content,
            category,
        } => {
            let mut draft = TemplateDraft::new(title, content);
            draft.category = category;
            let created = store.add(draft)?;
            println!("{} Added template: {}", "✓".green(), created.id.cyan());
        }
        Command::Edit {
            id,
            title,
            content,
            category,
        } => {
            let mut template = store.get(&id)?.ok_or_else(|| eyre!("Template not found: {}", id))?;
            if let Some(title) = title {
                template.title = title;
            }
            if let Some(content) = content {
                template.content = content;
            }
            if let Some(category) = category {
                template.category = Some(category);
            }
            store.update(template)?;
            println!("{} Updated template: {}", "✓".green(), id.cyan());
        }
        Command::Rm { id } => {
            store.remove(&id)?;
            println!("{} Deleted template: {}", "✓".green(), id);
        }
        Command::Export { output } => {
            let json = store.export()?;
            let output = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            if output.as_os_str() == "-" {
                println!("{}", json);
            } else {
                std::fs::write(&output, json).context(format!("Failed to write {}", output.display()))?;
                println!("{} Exported to {}", "✓".green(), output.display().to_string().cyan());
            }
        }
        Command::Import { file } => {
            let input = std::fs::read_to_string(&file).context(format!("Failed to read {}", file.display()))?;
            let report = store.import(&input)?;
            if report.is_partial() {
                warn!(rejected = report.total - report.imported, total = report.total, "Some templates were invalid");
                println!(
                    "{} Only {} out of {} templates were valid and imported",
                    "!".yellow(),
                    report.imported,
                    report.total
                );
            } else {
                println!("{} Imported {} of {} templates", "✓".green(), report.imported, report.total);
            }
        }
        Command::Render { id, vars, preview } => {
            let template = store.get(&id)?.ok_or_else(|| eyre!("Template not found: {}", id))?;
            let values: HashMap<String, String> = vars.into_iter().collect();
            let text = if preview {
                placeholder::preview(&template.content, &values)
            } else {
                placeholder::render(&template.content, &values)
            };
            let missing = placeholder::unfilled(&template.content, &values);
            if !missing.is_empty() {
                eprintln!("{} Unfilled placeholders: {}", "!".yellow(), missing.join(", "));
            }
            println!("{}", text);
        }
        Command::Insert { vars, preview } => {
            let background = Background::new(&store);
            let values: HashMap<String, String> = vars.into_iter().collect();
            match background.on_command(INSERT_TEMPLATE_COMMAND)? {
                Some(message) => {
                    if let Message::InsertTemplate { template } = &message {
                        let missing = placeholder::unfilled(&template.content, &values);
                        if !missing.is_empty() {
                            eprintln!("{} Unfilled placeholders: {}", "!".yellow(), missing.join(", "));
                        }
                    }
                    let mut editor = TextEditor::new();
                    handle_page_message(&message.filled(&values, preview), &mut editor);
                    println!("{}", editor.text());
                }
                None => println!("No templates found"),
            }
        }
        Command::Theme { theme } => match theme {
            Some(theme) => {
                store.set_theme(theme)?;
                println!("{} Theme set to {}", "✓".green(), theme.to_string().cyan());
            }
            None => println!("{}", store.theme()?),
        },
    }

    Ok(())
}
