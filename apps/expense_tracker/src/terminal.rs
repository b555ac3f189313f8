use std::io::Write as _;

use async_trait::async_trait;
use client_core::DeleteConfirmation;
use shared::domain::ExpenseId;
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

/// Line input shared by the command loop and confirmation prompts.
pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(stdin()).lines()),
        }
    }

    /// `None` once stdin is closed.
    pub async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        self.lines.lock().await.next_line().await
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl DeleteConfirmation for Terminal {
    async fn confirm_delete(&self, id: ExpenseId) -> bool {
        match self
            .read_line(&format!("Delete expense #{id}? [y/N] "))
            .await
        {
            Ok(Some(answer)) => is_yes(&answer),
            _ => false,
        }
    }
}
