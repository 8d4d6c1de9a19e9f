//! Chat command handler.
//!
//! An interactive loop over stdin: each line is run through the pipeline
//! and the answer printed. `exit` quits.

use clap::Args;
use std::io::{BufRead, Write};
use tabletalk_core::{AppConfig, AppResult};
use tabletalk_schema::PipelineOptions;

/// Interactive question-and-answer loop
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Number of table schemas to retrieve per question
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Total attempts at generating and executing SQL per question
    #[arg(long, default_value = "1")]
    pub retries: u32,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let pool = super::connect_pool(config).await?;
        let pipeline = super::build_pipeline(config, pool).await?;

        let opts = PipelineOptions {
            top_k: self.top_k.unwrap_or(config.top_k),
            retries: self.retries,
        };

        println!("Ask what you want? (type 'exit' to quit)");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("you> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question == "exit" || question == "quit" {
                break;
            }

            // One failed question should not end the session
            match pipeline.answer(question, &opts).await {
                Ok(result) => println!("Assistant: {}", result.answer),
                Err(e) => {
                    tracing::error!("Failed to answer question: {}", e);
                    println!("Assistant: Sorry, I could not answer that: {}", e);
                }
            }
        }

        Ok(())
    }
}
