//! Telegram delivery: one media group of product photos followed by one
//! aggregated MarkdownV2 digest message.

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, InputMedia, InputMediaPhoto, ParseMode};

use crate::config::Telegram;
use crate::error::CossError;
use crate::scrape::Product;

/// One digest line per result slot, MarkdownV2 dialect.
///
/// Literal hyphens must be escaped for MarkdownV2. Out-of-stock items are
/// struck through; a failed slot renders as a visible marker instead of
/// being dropped.
pub fn digest_line(product_base: &str, id: &str, result: &Result<Product, CossError>) -> String {
    match result {
        Ok(product) => {
            let name = product.name.replace('-', "\\-");
            let line = format!("[{name}: {}]({product_base}{id})", product.price);
            if product.status.is_in_stock() {
                line
            } else {
                format!("~{line}~")
            }
        }
        Err(_) => format!("{}: check failed", id.replace('-', "\\-")),
    }
}

pub struct Notifier {
    bot: Bot,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(telegram: &Telegram) -> Self {
        Self {
            bot: Bot::new(telegram.token.clone()),
            chat_id: ChatId(telegram.chat_id),
        }
    }

    /// Send the digest for an ordered batch of results.
    ///
    /// Failed slots contribute no photo, only their marker line; the digest
    /// goes out even when nothing is in stock. An empty batch sends
    /// nothing, since Telegram rejects empty messages.
    pub async fn send_digest(
        &self,
        product_base: &str,
        results: Vec<(String, Result<Product, CossError>)>,
    ) -> Result<(), CossError> {
        let mut media = Vec::new();
        let mut lines = Vec::new();

        for (id, result) in results {
            if let Err(error) = &result {
                tracing::warn!(product = %id, error = %error, "Product check failed");
            }
            lines.push(digest_line(product_base, &id, &result));
            if let Ok(product) = result {
                media.push(InputMedia::Photo(InputMediaPhoto::new(InputFile::memory(
                    product.image,
                ))));
            }
        }

        if lines.is_empty() {
            tracing::info!("No products configured, nothing to send");
            return Ok(());
        }

        if !media.is_empty() {
            self.bot.send_media_group(self.chat_id, media).await?;
        }
        self.bot
            .send_message(self.chat_id, lines.join("\n"))
            .parse_mode(ParseMode::MarkdownV2)
            .disable_web_page_preview(true)
            .await?;

        tracing::info!(lines = lines.len(), "Digest sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::StockStatus;

    const BASE: &str = "https://www.clasohlson.com/se/p/";

    fn product(name: &str, status: StockStatus) -> Result<Product, CossError> {
        Ok(Product {
            id: "40-1234".into(),
            name: name.into(),
            product_id: "400001234".into(),
            price: "499.00 SEK".into(),
            image: vec![0xff, 0xd8],
            status,
        })
    }

    #[test]
    fn in_stock_renders_as_plain_link() {
        let line = digest_line(BASE, "40-1234", &product("Workbench", StockStatus::InStock));
        assert_eq!(
            line,
            "[Workbench: 499.00 SEK](https://www.clasohlson.com/se/p/40-1234)"
        );
    }

    #[test]
    fn out_of_stock_is_struck_through() {
        let line = digest_line(
            BASE,
            "40-1234",
            &product("Workbench", StockStatus::Other("outOfStock".into())),
        );
        assert!(line.starts_with('~') && line.ends_with('~'));
    }

    #[test]
    fn hyphens_in_names_are_escaped() {
        let line = digest_line(BASE, "40-1234", &product("Multi-tool", StockStatus::InStock));
        assert!(line.contains("Multi\\-tool"));
    }

    #[test]
    fn failed_slot_renders_a_marker_line() {
        let line = digest_line(
            BASE,
            "40-1234",
            &Err(CossError::MissingField("productId")),
        );
        assert_eq!(line, "40\\-1234: check failed");
    }
}
