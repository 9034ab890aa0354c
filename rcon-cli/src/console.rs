//! Command loop: runs commands against an authenticated session and
//! writes each response to an output stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use rcon_core::{Result, Session};

/// Execute `commands` in order, writing each response to `out`.
///
/// Stops at the first failure. Returns how many commands ran.
pub async fn run_commands<S, W, I>(session: &mut Session<S>, commands: I, out: &mut W) -> Result<usize>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut count = 0;
    for command in commands {
        run_one(session, command.as_ref(), out).await?;
        count += 1;
    }
    Ok(count)
}

/// Read commands line by line from `input` until EOF and execute each.
/// Blank lines are skipped.
pub async fn run_lines<S, R, W>(session: &mut Session<S>, input: R, out: &mut W) -> Result<usize>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        run_one(session, command, out).await?;
        count += 1;
    }
    Ok(count)
}

async fn run_one<S, W>(session: &mut Session<S>, command: &str, out: &mut W) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    let response = session.execute(command).await?;
    debug!(command, bytes = response.len(), "response");

    out.write_all(response.as_bytes()).await?;
    if !response.ends_with('\n') {
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rcon_core::{Packet, PacketType, RconError, SessionConfig};
    use tokio_test::io::{Builder, Mock};

    fn frame(packet: Packet) -> Vec<u8> {
        packet.to_bytes().unwrap()
    }

    /// A mock stream that accepts password "pw" (id 1) and then serves
    /// the given (command, response) pairs with ids 2, 3, ...
    fn server(exchanges: &[(&str, &str)]) -> Mock {
        let mut builder = Builder::new();
        builder
            .write(&frame(Packet::auth(1, "pw")))
            .read(&frame(Packet::new(PacketType::AUTH_RESPONSE, 1, Vec::new())));
        for (i, (command, response)) in exchanges.iter().enumerate() {
            let id = i as i32 + 2;
            builder
                .write(&frame(Packet::command(id, *command)))
                .read(&frame(Packet::new(PacketType::RESPONSE_VALUE, id, *response)));
        }
        builder.build()
    }

    async fn authed(mock: Mock) -> Session<Mock> {
        let mut session = Session::attach(SessionConfig::default(), mock);
        session.authenticate("pw").await.unwrap();
        session
    }

    #[tokio::test]
    async fn commands_run_in_order() {
        let mut session = authed(server(&[
            ("status", "hostname: test\n"),
            ("bot_add_ct", "ok"),
        ]))
        .await;
        let mut out = Vec::new();

        let count = run_commands(&mut session, ["status", "bot_add_ct"], &mut out)
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "hostname: test\nok\n");
    }

    #[tokio::test]
    async fn lines_skip_blanks() {
        let mut session = authed(server(&[("status", "ok"), ("users", "none")])).await;
        let mut out = Vec::new();
        let input: &[u8] = b"status\n\n   \n  users  \n";

        let count = run_lines(&mut session, input, &mut out).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "ok\nnone\n");
    }

    #[tokio::test]
    async fn stops_at_first_error() {
        let mock = Builder::new()
            .write(&frame(Packet::auth(1, "pw")))
            .read(&frame(Packet::new(PacketType::AUTH_RESPONSE, 1, Vec::new())))
            .write(&frame(Packet::command(2, "status")))
            .read(&frame(Packet::new(PacketType::RESPONSE_VALUE, 7, "stale")))
            .build();
        let mut session = authed(mock).await;
        let mut out = Vec::new();

        let result = run_commands(&mut session, ["status", "never-sent"], &mut out).await;

        assert!(matches!(
            result,
            Err(RconError::CorrelationMismatch {
                expected: 2,
                actual: 7
            })
        ));
        assert!(out.is_empty());
    }
}
