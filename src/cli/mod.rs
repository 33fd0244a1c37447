use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Webhook Args ---
    /// Webhook endpoint that performs the actual chat processing.
    #[arg(long, env = "WEBHOOK_URL", default_value = "http://127.0.0.1:5678/webhook/cockpit-chat")]
    pub webhook_url: String,

    /// Optional endpoint returning the model catalog ({"models": [...]}).
    #[arg(long, env = "MODELS_URL")]
    pub models_url: Option<String>,

    /// Wire format for chat requests (json, multipart).
    #[arg(long, env = "WIRE_FORMAT", default_value = "json")]
    pub wire_format: String,

    /// Request timeout in seconds for webhook calls. One attempt, no retry.
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,

    /// Username for HTTP Basic auth towards the webhook.
    #[arg(long, env = "WEBHOOK_BASIC_USER")]
    pub basic_user: Option<String>,

    /// Password for HTTP Basic auth towards the webhook.
    #[arg(long, env = "WEBHOOK_BASIC_PASS")]
    pub basic_pass: Option<String>,

    // --- Session Args ---
    /// Active project name sent with every request.
    #[arg(long, env = "PROJECT", default_value = "default")]
    pub project: String,

    /// Path to a text file holding the master plan (project goal) sent with
    /// every request. Falls back to a built-in default.
    #[arg(long, env = "MASTER_PLAN_PATH")]
    pub master_plan_path: Option<String>,

    /// Model id to select at startup. Defaults to the first catalog entry.
    #[arg(long, env = "DEFAULT_MODEL")]
    pub model: Option<String>,

    /// Max history messages included in each request. 0 sends the full session.
    #[arg(long, env = "HISTORY_LIMIT", default_value = "0")]
    pub history_limit: usize,

    /// Conversation id for this session; random when omitted.
    #[arg(long, env = "CONVERSATION_ID")]
    pub conversation_id: Option<String>,

    /// Print the diagnostic summary after each reply.
    #[arg(long, env = "DEBUG_PANEL", default_value = "false")]
    pub debug_panel: bool,
}
