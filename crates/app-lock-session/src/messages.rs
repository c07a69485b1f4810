//! User-facing messages stored in the session `error` field.

pub const LOGIN_FAILED: &str =
    "Giriş yapılamadı. Lütfen internet bağlantınızı kontrol edin ve tekrar deneyin.";
pub const REGISTER_FAILED: &str =
    "Kayıt yapılamadı. Lütfen farklı bir kullanıcı adı deneyin veya daha sonra tekrar deneyin.";
pub const LOGOUT_FAILED: &str = "Çıkış yapılırken bir hata oluştu. Lütfen tekrar deneyin.";
pub const SET_APP_PASSWORD_FAILED: &str = "Uygulama şifresi ayarlanamadı. Lütfen tekrar deneyin.";
pub const VERIFY_APP_PASSWORD_FAILED: &str =
    "Uygulama şifresi doğrulanamadı. Lütfen tekrar deneyin.";
pub const INITIALIZE_FAILED: &str =
    "Kimlik doğrulama sırasında bir hata oluştu. Lütfen tekrar giriş yapın.";
pub const STATUS_CHECK_FAILED: &str =
    "Uygulama şifresi durumu kontrol edilemedi. Lütfen tekrar deneyin.";
pub const GENERIC_FAILURE: &str = "Bilinmeyen bir hata oluştu. Lütfen daha sonra tekrar deneyin.";

// Validation
pub const FIELDS_REQUIRED: &str = "Tüm alanları doldurunuz.";
pub const APP_PASSWORD_TOO_SHORT: &str = "Yeni şifre en az 4 karakter olmalıdır.";
pub const APP_PASSWORDS_DO_NOT_MATCH: &str = "Yeni şifreler eşleşmiyor.";
pub const CURRENT_APP_PASSWORD_WRONG: &str = "Mevcut şifre yanlış.";
