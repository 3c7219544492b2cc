use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sluglime_shared::Category;

/// Arguments for the sluglime CLI
#[derive(Parser, Debug)]
#[command(version, about = "Anonymous whistleblower reports: submit, track, browse")]
pub struct Args {
    #[clap(
        long,
        global = true,
        value_name = "URL",
        help = "Backend base URL [default: SLUGLIME_API_URL or http://localhost:5000]"
    )]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// File a new report and print its ticket and access code
    Submit {
        #[clap(short, long, help = "Short title, 2 to 200 characters")]
        title: String,

        #[clap(short, long, help = "What happened")]
        body: String,

        #[clap(
            short,
            long,
            help = "One of corruption, fraud, harassment, safety, other"
        )]
        category: Option<Category>,

        #[clap(
            short,
            long = "attach",
            value_name = "FILE",
            help = "PDF, DOCX, JPG, PNG or MP4 up to 25MB; repeat for several files"
        )]
        attachments: Vec<PathBuf>,
    },

    /// Show a report and its thread, optionally replying first
    Status {
        #[clap(short, long, help = "Ticket [default: last submitted]")]
        ticket: Option<String>,

        #[clap(short = 'k', long, value_name = "CODE", help = "Access code [default: last submitted]")]
        code: Option<String>,

        #[clap(short, long, value_name = "MESSAGE", help = "Message to send to the moderators")]
        reply: Option<String>,
    },

    /// List public reports
    Feed,

    /// Forget the cached ticket and access code
    Logout,
}
