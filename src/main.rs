use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::io::{self, BufRead, Write};
use vkcomments::cli::{Cli, Commands};
use vkcomments::config::AppConfig;
use vkcomments::operations::export::{ExportOperation, ExportOptions};

/// Print a prompt and read one line from `input`.
///
/// Returns `None` once the input is exhausted or unreadable, so a closed
/// stdin ends the run instead of looping.
fn prompt_line<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Keep prompting until a whole number is entered or the input ends.
fn prompt_count<R: BufRead>(input: &mut R, label: &str) -> Option<usize> {
    loop {
        match prompt_line(input, label)?.parse::<usize>() {
            Ok(count) => return Some(count),
            Err(_) => eprintln!("Please enter a whole number."),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load();

    match cli.command {
        Commands::Export {
            group,
            count,
            token,
            output,
        } => {
            let mut stdin = io::stdin().lock();

            let Some(group_domain) = group
                .or_else(|| config.group_domain.clone())
                .or_else(|| prompt_line(&mut stdin, "Enter the VK group domain"))
            else {
                error!("Standard input closed before a group domain was provided.");
                return;
            };

            let Some(access_token) = token
                .or_else(|| config.access_token.clone())
                .or_else(|| prompt_line(&mut stdin, "Enter your VK API access token"))
            else {
                error!("Standard input closed before an access token was provided.");
                return;
            };

            let Some(post_count) = count
                .or(config.post_count)
                .or_else(|| prompt_count(&mut stdin, "Enter the number of posts to process"))
            else {
                error!("Standard input closed before a post count was provided.");
                return;
            };

            info!("Please wait...");

            let client = config.create_client(access_token);
            let options = ExportOptions {
                group_domain: group_domain.clone(),
                post_count,
                filename: output,
            };

            let operation = ExportOperation::new(options, client);
            match operation.execute().await {
                Ok(result) => {
                    if let Some(combined_file) = result.combined_file {
                        info!(
                            "User IDs, names, and comments for group {} saved to {} \
                             ({} rows, {} batches).",
                            group_domain, combined_file, result.row_count, result.batch_count
                        );
                    }
                }
                Err(err) => error!(
                    "Failed to export comments for group {}: {}. \
                     Check if the group domain and access token are correct.",
                    group_domain, err
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn count_prompt_retries_until_a_number() {
        let mut input = Cursor::new("abc\n\n12\n");
        assert_eq!(prompt_count(&mut input, "count"), Some(12));
    }

    #[test]
    fn closed_input_ends_the_count_prompt() {
        let mut input = Cursor::new("");
        assert_eq!(prompt_count(&mut input, "count"), None);
    }

    #[test]
    fn garbage_then_eof_stops_instead_of_looping() {
        let mut input = Cursor::new("not a number\n");
        assert_eq!(prompt_count(&mut input, "count"), None);
    }

    #[test]
    fn prompt_line_trims_the_newline() {
        let mut input = Cursor::new("examplegroup\n");
        assert_eq!(
            prompt_line(&mut input, "group").as_deref(),
            Some("examplegroup")
        );
    }
}
