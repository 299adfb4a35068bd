use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::MailConfig,
    error::{AppError, AppResult},
    models::{CartItem, User},
};

#[derive(Debug, Clone, Copy)]
pub enum CartAction {
    Add,
    Remove,
    Update,
}

/// Outbound notification channel. Without MAIL_SERVER configured the mailer
/// degrades to log-only delivery, which the tests rely on.
#[derive(Clone)]
pub struct Mailer {
    sender: Mailbox,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    pub fn from_config(cfg: &MailConfig) -> anyhow::Result<Self> {
        let sender: Mailbox = cfg
            .sender
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid MAIL_DEFAULT_SENDER: {e}"))?;

        let transport = match cfg.server.as_deref() {
            Some(server) => {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?.port(cfg.port);
                if let (Some(user), Some(pass)) = (cfg.username.clone(), cfg.password.clone()) {
                    builder = builder.credentials(Credentials::new(user, pass));
                }
                Some(builder.build())
            }
            None => {
                tracing::warn!("MAIL_SERVER not set, mail delivery is log-only");
                None
            }
        };

        Ok(Self { sender, transport })
    }

    /// Log-only mailer for tests and local runs.
    pub fn disabled() -> Self {
        Self {
            sender: Mailbox::new(None, "noreply@localhost".parse().unwrap()),
            transport: None,
        }
    }

    /// Deliver one message, propagating any failure to the caller.
    pub async fn try_send(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        let to: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            AppError::Mail(e.to_string())
        })?;

        let Some(transport) = &self.transport else {
            tracing::info!(to = %to, subject, "mail (log-only): {body}");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to.clone())
            .subject(subject)
            .body(body)
            .map_err(|e| AppError::Mail(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        tracing::debug!(to = %to, subject, "mail sent");
        Ok(())
    }

    /// Best-effort cart mutation notice; delivery errors are logged and swallowed.
    pub async fn send_cart_update(&self, to: &str, action: CartAction, product_name: &str) {
        let body = match action {
            CartAction::Add => format!(
                "\"{product_name}\" ürünü sepetinize eklendi. Alışverişinizi tamamlamak için sitemizi ziyaret edebilirsiniz."
            ),
            CartAction::Remove => format!("\"{product_name}\" ürünü sepetinizden çıkarıldı."),
            CartAction::Update => {
                format!("\"{product_name}\" ürününün sepetinizdeki miktarı güncellendi.")
            }
        };
        if let Err(err) = self.try_send(to, "Sepet Güncellemesi", body).await {
            tracing::warn!(error = %err, "cart update mail failed");
        }
    }

    /// Best-effort password-reset link; the reset flow does not fail hard on
    /// delivery problems.
    pub async fn send_verification_email(&self, to: &str, verify_link: &str) {
        let body = format!(
            "Şifre sıfırlamak için bu bağlantıya tıklayın: {verify_link}\nBu bağlantı 15 dakika geçerlidir."
        );
        if let Err(err) = self.try_send(to, "Şifre Sıfırlama Doğrulama", body).await {
            tracing::warn!(error = %err, "verification mail failed");
        }
    }

    /// Sale notice to a product owner at checkout. Failures propagate so the
    /// checkout workflow can abort with the cart intact.
    pub async fn send_sale_notification(&self, owner: &User, item: &CartItem) -> AppResult<()> {
        let body = format!(
            "Merhaba {},\n\n'{}' adlı ürününüz satılmıştır!\nDetaylar:\n- Ürün: {}\n- Fiyat: {} TL\n- Adet: {}\n- Toplam: {} TL\n",
            owner.username,
            item.name,
            item.name,
            item.price,
            item.quantity,
            item.price * item.quantity as i64,
        );
        self.try_send(&owner.email, "Ürününüz Satıldı!", body).await
    }
}
