use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;

use rentdesk_cli::{CliConfig, Outcome, Session};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::from_env().context("invalid rentdesk configuration")?;
    rentdesk_observability::init(config.log_format);

    let mut session = Session::new(config);
    let settings = session.config();
    tracing::info!(
        "rentdesk starting (ids: {:?}, rental period: {} days, output: {:?})",
        settings.id_strategy,
        settings.rental_days,
        settings.output
    );

    let interactive = io::stdin().is_terminal();
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    if interactive {
        writeln!(stdout, "rentdesk: type 'help' for commands")?;
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            write!(stdout, "> ")?;
            stdout.flush().context("failed to flush stdout")?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        match session.run_line(&line) {
            Ok(Some(Outcome::Output(text))) => writeln!(stdout, "{text}")?,
            Ok(Some(Outcome::Quit)) => break,
            Ok(None) => {}
            Err(err) => writeln!(stdout, "{}", session.render_error(&err))?,
        }
    }

    let stats = session.ledger().stats();
    tracing::info!(
        "rentdesk exiting ({} items, {} rented, {} history records)",
        stats.total,
        stats.rented,
        session.ledger().history().len()
    );
    Ok(())
}
