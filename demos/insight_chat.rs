use dotenv::dotenv;
use relanto_insight::llm::prompts::ASSISTANT_GREETING;
use relanto_insight::llm::GeminiClient;
use relanto_insight::{ConversationTurn, InsightActions};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let actions = InsightActions::new(Arc::new(GeminiClient::from_env()));

    // The dashboard seeds every conversation with this greeting.
    let mut history = vec![ConversationTurn::model(ASSISTANT_GREETING)];

    println!("💬 {}", ASSISTANT_GREETING);
    println!("(type 'quit' to exit)");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let message = input.trim();

        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        println!("\nThinking...");

        match actions.chat(&history, message).await.into_result() {
            Ok(reply) => {
                println!("\n{}\n", reply);
                println!("------------------------------------------------------------------");
                history.push(ConversationTurn::user(message));
                history.push(ConversationTurn::model(reply));
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
            }
        }
    }

    Ok(())
}
