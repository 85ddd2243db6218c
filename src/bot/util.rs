use teloxide::prelude::*;

const MAX_MESSAGE_LENGTH: usize = 4096;

/// Rate-limit key for a message: the sender when known, else the chat.
pub fn caller_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map(|user| user.id.0 as i64)
        .unwrap_or(msg.chat.id.0)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

pub fn split_message(text: &str) -> Vec<String> {
    if text.len() <= MAX_MESSAGE_LENGTH {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= MAX_MESSAGE_LENGTH {
            chunks.push(remaining.to_string());
            break;
        }

        let limit = floor_char_boundary(remaining, MAX_MESSAGE_LENGTH);

        // Try to split at newline
        let search_range = &remaining[..limit];
        let mut split_index = search_range.rfind('\n').unwrap_or(0);

        if split_index == 0 || split_index < MAX_MESSAGE_LENGTH / 2 {
            // Fall back to space
            split_index = search_range.rfind(' ').unwrap_or(0);
        }

        if split_index == 0 || split_index < MAX_MESSAGE_LENGTH / 2 {
            // Hard split
            split_index = limit;
        }

        chunks.push(remaining[..split_index].to_string());
        remaining = remaining[split_index..].trim_start();
    }

    chunks
}

pub async fn send_reply(bot: &Bot, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
    for chunk in split_message(text.trim()) {
        if chunk.is_empty() {
            continue;
        }
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        let chunks = split_message("hello");
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_split_at_newline() {
        let text = format!("{}\n{}", "a".repeat(3000), "b".repeat(3000));
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(3000));
        assert_eq!(chunks[1], "b".repeat(3000));
    }

    #[test]
    fn test_split_hard() {
        let text = "a".repeat(5000);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        // 3-byte chars: 4096 is not a boundary
        let text = "\u{20ac}".repeat(2000);
        let chunks = split_message(&text);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= MAX_MESSAGE_LENGTH));
    }

    #[test]
    fn test_split_exactly_max() {
        let text = "a".repeat(MAX_MESSAGE_LENGTH);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 1);
    }
}
