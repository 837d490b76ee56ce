use dotenvy::dotenv;
use media_fetch_bot::bot::handlers::{self, Command};
use media_fetch_bot::config::Settings;
use media_fetch_bot::download::{Downloader, YtDlp};
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Generic notice for errors that escape the specific handlers.
const GENERIC_ERROR_TEXT: &str = "An error occurred. Please try again.";

/// Redacts Telegram bot tokens from log output.
struct TokenRedactor {
    patterns: Vec<(Regex, &'static str)>,
}

impl TokenRedactor {
    /// Compile the redaction patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid.
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: vec![
                (
                    Regex::new(r"(https?://[^/]+/bot)[0-9]+:[A-Za-z0-9_-]+")?,
                    "$1[TELEGRAM_TOKEN]",
                ),
                (
                    Regex::new(r"[0-9]{8,10}:[A-Za-z0-9_-]{35}")?,
                    "[TELEGRAM_TOKEN]",
                ),
            ],
        })
    }

    fn redact(&self, input: &str) -> String {
        self.patterns
            .iter()
            .fold(input.to_string(), |acc, (pattern, replacement)| {
                pattern.replace_all(&acc, *replacement).to_string()
            })
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    redactor: Arc<TokenRedactor>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.inner.write_all(self.redactor.redact(&s).as_bytes())?;
        // Report the original length to satisfy the Write contract even
        // when the redacted output differs in size.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter {
    redactor: Arc<TokenRedactor>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: io::stderr(),
            redactor: self.redactor.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let redactor = Arc::new(TokenRedactor::new().map_err(|e| {
        eprintln!("Failed to compile redaction patterns: {e}");
        e
    })?);
    init_logging(redactor);

    info!("Starting media fetch bot...");

    let settings = match Settings::new() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return Ok(());
        }
    };

    let downloader = Arc::new(Downloader::new(
        YtDlp::new(settings.ytdlp_bin.clone()),
        settings.download_dir.clone(),
    ));

    let bot = Bot::new(settings.telegram_token.clone());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![downloader])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging(redactor: Arc<TokenRedactor>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(RedactingMakeWriter { redactor }))
        .init();
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(quality_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(run_command),
                )
                .branch(
                    Update::filter_message()
                        .filter(|msg: Message| msg.text().is_some())
                        .endpoint(url_message),
                ),
        )
}

async fn run_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let res = match cmd {
        Command::Start => handlers::start(bot.clone(), msg).await,
        Command::Help => handlers::help(bot.clone(), msg).await,
        Command::Contact => handlers::contact(bot.clone(), msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {e}");
        let _ = bot.send_message(chat_id, GENERIC_ERROR_TEXT).await;
    }
    respond(())
}

async fn url_message(bot: Bot, msg: Message) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    if let Err(e) = handlers::handle_url_message(bot.clone(), msg).await {
        error!("Message handler error: {e}");
        let _ = bot.send_message(chat_id, GENERIC_ERROR_TEXT).await;
    }
    respond(())
}

async fn quality_callback(
    bot: Bot,
    q: CallbackQuery,
    downloader: Arc<Downloader<YtDlp>>,
) -> ResponseResult<()> {
    let chat_id = q.message.as_ref().map(|msg| msg.chat().id);
    if let Err(e) = handlers::handle_quality_selection(bot.clone(), q, downloader).await {
        error!("Callback handler error: {e}");
        if let Some(chat_id) = chat_id {
            let _ = bot.send_message(chat_id, GENERIC_ERROR_TEXT).await;
        }
    }
    respond(())
}
