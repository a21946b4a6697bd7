//! Language negotiation and the compiled-in message catalogs.
//!
//! Every user-facing message leaves the API as a stable key translated here at
//! the boundary; handlers and services never carry display strings.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Tr,
}

impl Lang {
    /// Pick the first supported language from an `Accept-Language` header.
    /// Quality weights are ignored; header order decides.
    #[must_use]
    pub fn negotiate(headers: &HeaderMap) -> Self {
        let Some(value) = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
        else {
            return Self::En;
        };

        for entry in value.split(',') {
            let tag = entry.split(';').next().unwrap_or("").trim();
            let primary = tag.split('-').next().unwrap_or("");

            match primary.to_ascii_lowercase().as_str() {
                "en" => return Self::En,
                "tr" => return Self::Tr,
                _ => {}
            }
        }

        Self::En
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::negotiate(&parts.headers))
    }
}

/// Resolve a message key in the given language. Unknown keys fall back to the
/// key itself so a missing entry is visible instead of silent.
#[must_use]
pub fn translate(lang: Lang, key: &str) -> &str {
    let message = match lang {
        Lang::En => english(key),
        Lang::Tr => turkish(key),
    };

    message.unwrap_or(key)
}

fn english(key: &str) -> Option<&'static str> {
    let message = match key {
        "blank" => "Cannot be null",
        "username_size" => "Must have min 4 and max 32 characters",
        "not_valid" => "E-mail is not valid",
        "been_taken" => "E-mail in use",
        "password_size" => "Password must be at least 6 characters",
        "password_chars" => "Password must have at least 1 uppercase, 1 lowercase letter and 1 number",
        "user_created" => "User created",
        "validation_failure" => "Validation Failure",
        "account_activation_success" => "Account is activated",
        "account_activation_failure" => "This account is either active or the token is invalid",
        "email_failure" => "E-mail Failure",
        "user_not_found" => "User not found",
        "unauthorized_user_update" => "You are not authorized to update user",
        "unauthorized_user_delete" => "You are not authorized to delete user",
        "user_delete_success" => "User is deleted",
        "authentication_failure" => "Incorrect credentials",
        "inactive_authentication_failure" => "Account is inactive",
        "internal_failure" => "Unexpected error occurred",
        _ => return None,
    };

    Some(message)
}

fn turkish(key: &str) -> Option<&'static str> {
    let message = match key {
        "blank" => "Boş olamaz",
        "username_size" => "En az 4 en fazla 32 karakter olmalı",
        "not_valid" => "E-posta geçerli değil",
        "been_taken" => "Bu E-posta kullanılıyor",
        "password_size" => "Şifre en az 6 karakter olmalı",
        "password_chars" => "Şifrede en az 1 büyük, 1 küçük harf ve 1 sayı bulunmalıdır",
        "user_created" => "Kullanıcı oluşturuldu",
        "validation_failure" => "Doğrulama Hatası",
        "account_activation_success" => "Hesap aktifleştirildi",
        "account_activation_failure" => "Bu hesap daha önce aktifleştirilmiş olabilir ya da token hatalı",
        "email_failure" => "E-posta gönderiminde hata oluştu",
        "user_not_found" => "Kullanıcı bulunamadı",
        "unauthorized_user_update" => "Bu işlem için yetkiniz bulunmamaktadır",
        "unauthorized_user_delete" => "Bu işlem için yetkiniz bulunmamaktadır",
        "user_delete_success" => "Kullanıcı silindi",
        "authentication_failure" => "Kullanıcı bilgileri hatalı",
        "inactive_authentication_failure" => "Hesabınız aktif değil",
        "internal_failure" => "Beklenmeyen bir hata oluştu",
        _ => return None,
    };

    Some(message)
}
