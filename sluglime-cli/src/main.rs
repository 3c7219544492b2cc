//! The sluglime command-line client

mod args;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;

use sluglime_client::attachment::load_attachment;
use sluglime_client::{
    ClientConfig, FeedFlow, FeedState, HttpReportApi, Receipt, Session, StatusFlow, SubmitFlow,
};
use sluglime_shared::telemetry::init_tracing;
use sluglime_shared::{Category, Report};

use crate::args::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("sluglime-cli");

    let mut config = ClientConfig::load()?;
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url);
    }
    let api = HttpReportApi::new(&config)?;
    let mut session = Session::load(config.session_path());
    tracing::debug!(api_url = api.base_url(), "sluglime-cli starting");

    match args.command {
        Command::Submit {
            title,
            body,
            category,
            attachments,
        } => submit(&api, &mut session, title, body, category, attachments).await,
        Command::Status {
            ticket,
            code,
            reply,
        } => status(&api, &session, ticket, code, reply).await,
        Command::Feed => feed(&api).await,
        Command::Logout => {
            session.clear()?;
            println!("Cached ticket and access code removed.");
            Ok(())
        }
    }
}

async fn submit(
    api: &HttpReportApi,
    session: &mut Session,
    title: String,
    body: String,
    category: Option<Category>,
    attachments: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut flow = SubmitFlow::new();
    flow.set_title(title)?;
    flow.set_body(body)?;
    flow.set_category(category)?;
    for path in &attachments {
        let attachment = load_attachment(path)?;
        flow.add_attachment(attachment)?;
    }

    flow.submit(api, session).await?;
    let receipt = flow.take_receipt().context("submission finished without a receipt")?;
    print_receipt(&receipt);
    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    println!("Report submitted.");
    println!();
    println!("  Ticket:      {}", receipt.ticket());
    println!("  Access code: {}", receipt.access_code().expose());
    println!();
    println!("{}", Receipt::WARNING);
}

async fn status(
    api: &HttpReportApi,
    session: &Session,
    ticket: Option<String>,
    code: Option<String>,
    reply: Option<String>,
) -> anyhow::Result<()> {
    let mut flow = StatusFlow::from_session(session);
    if let Some(ticket) = ticket {
        flow.set_ticket(ticket);
    }
    if let Some(code) = code {
        flow.set_access_code(code);
    }

    flow.load(api).await?;
    if let Some(reply) = reply {
        flow.set_reply(reply);
        flow.send(api).await?;
        println!("Message sent.");
        println!();
    }

    let report = flow.report().context("report missing after load")?;
    print_report(report);
    Ok(())
}

fn print_report(report: &Report) {
    println!("{} [{}]", report.title, report.ticket);
    print!("Status: {}", report.status.label());
    if let Some(category) = report.category {
        print!("  Category: {category}");
    }
    println!();
    println!("Submitted: {}", report.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", report.body);
    println!();

    if report.messages.is_empty() {
        println!("No messages yet.");
        return;
    }
    for message in &report.messages {
        println!(
            "--- {} ({})",
            message.role,
            message.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
        println!("{}", message.body);
    }
}

async fn feed(api: &HttpReportApi) -> anyhow::Result<()> {
    let mut flow = FeedFlow::new();
    flow.load(api).await?;

    match flow.state() {
        FeedState::Empty => println!("No reports yet"),
        FeedState::Loaded(reports) => {
            for report in reports {
                let category = report.category.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{}  {:<12}  {:<11}  {:<10}  {}",
                    report.created_at.with_timezone(&Local).format("%Y-%m-%d"),
                    report.ticket.as_str(),
                    report.status.label(),
                    category,
                    report.title
                );
            }
        }
        // load() returns the error before either of these can be observed
        FeedState::Loading | FeedState::Failed(_) => {}
    }
    Ok(())
}
