//! Localized message tables.
//!
//! Tables are keyed by two-letter language code. A missing language, or a
//! key missing from a language, falls back to English.

/// Message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Welcome,
    PlansButton,
    BalanceButton,
    SupportButton,
    MainMenu,
    ChooseLanguage,
    CompoundOn,
    CompoundOff,
    NotAuthorized,
    AskName,
    AskEmail,
    AskCountry,
    AskPayoutAddress,
    DetailsSaved,
    ChooseCurrency,
    ChooseNetwork,
    DepositAddress,
    AddressUnavailable,
    AskTxId,
    AskTxIdAgain,
    InvalidTxId,
    TxIdReceived,
    DepositConfirmed,
    Activated,
    Cancelled,
    OptionExpired,
}

impl Msg {
    pub const ALL: [Msg; 26] = [
        Msg::Welcome,
        Msg::PlansButton,
        Msg::BalanceButton,
        Msg::SupportButton,
        Msg::MainMenu,
        Msg::ChooseLanguage,
        Msg::CompoundOn,
        Msg::CompoundOff,
        Msg::NotAuthorized,
        Msg::AskName,
        Msg::AskEmail,
        Msg::AskCountry,
        Msg::AskPayoutAddress,
        Msg::DetailsSaved,
        Msg::ChooseCurrency,
        Msg::ChooseNetwork,
        Msg::DepositAddress,
        Msg::AddressUnavailable,
        Msg::AskTxId,
        Msg::AskTxIdAgain,
        Msg::InvalidTxId,
        Msg::TxIdReceived,
        Msg::DepositConfirmed,
        Msg::Activated,
        Msg::Cancelled,
        Msg::OptionExpired,
    ];
}

pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages offered in the picker: code and native name.
pub const LANGUAGES: [(&str, &str); 9] = [
    ("en", "English"),
    ("es", "Español"),
    ("ru", "Русский"),
    ("ar", "العربية"),
    ("id", "Bahasa Indonesia"),
    ("de", "Deutsch"),
    ("hi", "हिन्दी"),
    ("fr", "Français"),
    ("zh", "中文"),
];

type Table = &'static [(Msg, &'static str)];

const EN: Table = &[
    (Msg::Welcome, "Welcome! Please choose an option:"),
    (Msg::PlansButton, "Plans"),
    (Msg::BalanceButton, "Balance"),
    (Msg::SupportButton, "Contact Support"),
    (Msg::MainMenu, "Main Menu:"),
    (Msg::ChooseLanguage, "Choose your language:"),
    (Msg::CompoundOn, "Compounding enabled."),
    (Msg::CompoundOff, "Compounding disabled."),
    (Msg::NotAuthorized, "You are not authorized to use this command."),
    (Msg::AskName, "Please enter your full name:"),
    (Msg::AskEmail, "Please enter your email address:"),
    (Msg::AskCountry, "Please enter your country:"),
    (Msg::AskPayoutAddress, "Please enter the wallet address for payouts:"),
    (Msg::DetailsSaved, "Details saved. Now choose your deposit currency:"),
    (Msg::ChooseCurrency, "Choose your deposit currency:"),
    (Msg::ChooseNetwork, "Choose the USDT network:"),
    (
        Msg::DepositAddress,
        "Send your deposit in {currency} to this address:\n{address}\n\nPress the button below once it is sent.",
    ),
    (
        Msg::AddressUnavailable,
        "No deposit address is configured for {currency}. Please choose another currency.",
    ),
    (Msg::AskTxId, "Please enter your transaction ID:"),
    (Msg::AskTxIdAgain, "Please enter your transaction ID again:"),
    (
        Msg::InvalidTxId,
        "The transaction could not be confirmed on chain. Please check the ID and try again:",
    ),
    (
        Msg::TxIdReceived,
        "Transaction {txid} is confirmed on chain.\nThe deposit recorded for your plan is {amount}.\nPlease confirm.",
    ),
    (
        Msg::DepositConfirmed,
        "Deposit of {amount} recorded. Please send the wallet address for payouts:",
    ),
    (Msg::Activated, "Your account is active."),
    (Msg::Cancelled, "Cancelled."),
    (Msg::OptionExpired, "This option is no longer available."),
];

const ES: Table = &[
    (Msg::Welcome, "¡Bienvenido! Por favor, elige una opción:"),
    (Msg::PlansButton, "Planes"),
    (Msg::BalanceButton, "Saldo"),
    (Msg::SupportButton, "Contactar Soporte"),
    (Msg::MainMenu, "Menú Principal:"),
    (Msg::ChooseLanguage, "Elige tu idioma:"),
    (Msg::CompoundOn, "Capitalización activada."),
    (Msg::CompoundOff, "Capitalización desactivada."),
    (Msg::NotAuthorized, "No estás autorizado para usar este comando."),
    (Msg::AskName, "Por favor, ingresa tu nombre completo:"),
    (Msg::AskEmail, "Por favor, ingresa tu dirección de correo electrónico:"),
    (Msg::AskCountry, "Por favor, ingresa tu país:"),
    (Msg::AskPayoutAddress, "Por favor, ingresa la dirección de billetera para los pagos:"),
    (Msg::DetailsSaved, "Detalles guardados. Ahora elige tu moneda de depósito:"),
    (Msg::ChooseCurrency, "Elige tu moneda de depósito:"),
    (Msg::ChooseNetwork, "Elige la red de USDT:"),
    (
        Msg::DepositAddress,
        "Envía tu depósito en {currency} a esta dirección:\n{address}\n\nPulsa el botón de abajo cuando lo hayas enviado.",
    ),
    (Msg::AskTxId, "Por favor, ingresa tu ID de transacción:"),
    (
        Msg::InvalidTxId,
        "No se pudo confirmar la transacción. Revisa el ID e inténtalo de nuevo:",
    ),
    (
        Msg::TxIdReceived,
        "La transacción {txid} está confirmada.\nEl depósito registrado para tu plan es {amount}.\nPor favor, confirma.",
    ),
    (
        Msg::DepositConfirmed,
        "Depósito de {amount} registrado. Envía la dirección de billetera para los pagos:",
    ),
    (Msg::Activated, "Tu cuenta está activa."),
];

const FR: Table = &[
    (Msg::Welcome, "Bienvenue ! Veuillez choisir une option :"),
    (Msg::PlansButton, "Offres"),
    (Msg::BalanceButton, "Solde"),
    (Msg::SupportButton, "Contacter le Support"),
    (Msg::MainMenu, "Menu Principal :"),
    (Msg::ChooseLanguage, "Choisissez votre langue :"),
    (Msg::CompoundOn, "Capitalisation activée."),
    (Msg::CompoundOff, "Capitalisation désactivée."),
    (Msg::NotAuthorized, "Vous n'êtes pas autorisé à utiliser cette commande."),
    (Msg::AskName, "Veuillez entrer votre nom complet :"),
    (Msg::AskEmail, "Veuillez entrer votre adresse email :"),
    (Msg::AskCountry, "Veuillez entrer votre pays :"),
    (Msg::AskPayoutAddress, "Veuillez entrer l'adresse du portefeuille pour les paiements :"),
    (Msg::DetailsSaved, "Détails enregistrés. Choisissez maintenant votre devise de dépôt :"),
    (Msg::ChooseCurrency, "Choisissez votre devise de dépôt :"),
    (Msg::ChooseNetwork, "Choisissez le réseau USDT :"),
    (Msg::AskTxId, "Veuillez entrer votre ID de transaction :"),
    (
        Msg::InvalidTxId,
        "La transaction n'a pas pu être confirmée. Vérifiez l'ID et réessayez :",
    ),
    (
        Msg::TxIdReceived,
        "La transaction {txid} est confirmée.\nLe dépôt enregistré pour votre offre est de {amount}.\nVeuillez confirmer.",
    ),
    (
        Msg::DepositConfirmed,
        "Dépôt de {amount} enregistré. Veuillez envoyer l'adresse du portefeuille pour les paiements :",
    ),
    (Msg::Activated, "Votre compte est actif."),
];

const DE: Table = &[
    (Msg::Welcome, "Willkommen! Bitte wählen Sie eine Option:"),
    (Msg::PlansButton, "Pläne"),
    (Msg::BalanceButton, "Kontostand"),
    (Msg::SupportButton, "Support kontaktieren"),
    (Msg::MainMenu, "Hauptmenü:"),
    (Msg::ChooseLanguage, "Wählen Sie Ihre Sprache:"),
    (Msg::CompoundOn, "Zinseszins aktiviert."),
    (Msg::CompoundOff, "Zinseszins deaktiviert."),
    (Msg::NotAuthorized, "Sie sind nicht berechtigt, diesen Befehl zu verwenden."),
    (Msg::AskName, "Bitte geben Sie Ihren vollständigen Namen ein:"),
    (Msg::AskEmail, "Bitte geben Sie Ihre E-Mail-Adresse ein:"),
    (Msg::AskCountry, "Bitte geben Sie Ihr Land ein:"),
    (Msg::AskPayoutAddress, "Bitte geben Sie die Wallet-Adresse für Auszahlungen ein:"),
    (Msg::DetailsSaved, "Details gespeichert. Wählen Sie jetzt Ihre Einzahlungswährung:"),
    (Msg::ChooseCurrency, "Wählen Sie Ihre Einzahlungswährung:"),
    (Msg::ChooseNetwork, "Wählen Sie das USDT-Netzwerk:"),
    (Msg::AskTxId, "Bitte geben Sie Ihre Transaktions-ID ein:"),
    (
        Msg::InvalidTxId,
        "Die Transaktion konnte nicht bestätigt werden. Bitte prüfen Sie die ID und versuchen Sie es erneut:",
    ),
    (
        Msg::TxIdReceived,
        "Transaktion {txid} ist bestätigt.\nDie für Ihren Plan erfasste Einzahlung beträgt {amount}.\nBitte bestätigen Sie.",
    ),
    (
        Msg::DepositConfirmed,
        "Einzahlung von {amount} erfasst. Bitte senden Sie die Wallet-Adresse für Auszahlungen:",
    ),
    (Msg::Activated, "Ihr Konto ist aktiv."),
];

const RU: Table = &[
    (Msg::Welcome, "Добро пожаловать! Пожалуйста, выберите опцию:"),
    (Msg::PlansButton, "Планы"),
    (Msg::BalanceButton, "Баланс"),
    (Msg::SupportButton, "Связаться с поддержкой"),
    (Msg::MainMenu, "Главное меню:"),
    (Msg::ChooseLanguage, "Выберите ваш язык:"),
    (Msg::CompoundOn, "Капитализация включена."),
    (Msg::CompoundOff, "Капитализация отключена."),
    (Msg::NotAuthorized, "У вас нет прав для использования этой команды."),
    (Msg::AskName, "Пожалуйста, введите ваше полное имя:"),
    (Msg::AskEmail, "Пожалуйста, введите ваш адрес электронной почты:"),
    (Msg::AskCountry, "Пожалуйста, введите вашу страну:"),
    (Msg::AskPayoutAddress, "Пожалуйста, введите адрес кошелька для выплат:"),
    (Msg::DetailsSaved, "Данные сохранены. Теперь выберите валюту депозита:"),
    (Msg::ChooseCurrency, "Выберите валюту депозита:"),
    (Msg::ChooseNetwork, "Выберите сеть USDT:"),
    (Msg::AskTxId, "Пожалуйста, введите ID транзакции:"),
    (
        Msg::InvalidTxId,
        "Не удалось подтвердить транзакцию. Проверьте ID и попробуйте еще раз:",
    ),
    (
        Msg::TxIdReceived,
        "Транзакция {txid} подтверждена.\nДепозит по вашему плану: {amount}.\nПожалуйста, подтвердите.",
    ),
    (
        Msg::DepositConfirmed,
        "Депозит {amount} записан. Пожалуйста, отправьте адрес кошелька для выплат:",
    ),
    (Msg::Activated, "Ваш аккаунт активен."),
];

const ID: Table = &[
    (Msg::Welcome, "Selamat datang! Silakan pilih opsi:"),
    (Msg::PlansButton, "Paket"),
    (Msg::BalanceButton, "Saldo"),
    (Msg::SupportButton, "Hubungi Dukungan"),
    (Msg::MainMenu, "Menu Utama:"),
    (Msg::ChooseLanguage, "Pilih bahasa Anda:"),
    (Msg::CompoundOn, "Kompaun diaktifkan."),
    (Msg::CompoundOff, "Kompaun dinonaktifkan."),
    (Msg::NotAuthorized, "Anda tidak diizinkan menggunakan perintah ini."),
    (Msg::AskName, "Silakan masukkan nama lengkap Anda:"),
    (Msg::AskEmail, "Silakan masukkan alamat email Anda:"),
    (Msg::AskCountry, "Silakan masukkan negara Anda:"),
    (Msg::AskPayoutAddress, "Silakan masukkan alamat dompet untuk pembayaran:"),
    (Msg::DetailsSaved, "Detail disimpan. Sekarang pilih mata uang deposit Anda:"),
    (Msg::ChooseCurrency, "Pilih mata uang deposit Anda:"),
    (Msg::ChooseNetwork, "Pilih jaringan USDT:"),
    (Msg::AskTxId, "Silakan masukkan ID transaksi Anda:"),
    (
        Msg::InvalidTxId,
        "Transaksi tidak dapat dikonfirmasi. Periksa ID dan coba lagi:",
    ),
    (
        Msg::TxIdReceived,
        "Transaksi {txid} telah dikonfirmasi.\nDeposit yang tercatat untuk paket Anda adalah {amount}.\nSilakan konfirmasi.",
    ),
    (
        Msg::DepositConfirmed,
        "Deposit sebesar {amount} tercatat. Silakan kirim alamat dompet untuk pembayaran:",
    ),
    (Msg::Activated, "Akun Anda aktif."),
];

const AR: Table = &[
    (Msg::Welcome, "مرحبًا بك! الرجاء اختيار خيار:"),
    (Msg::PlansButton, "الخطط"),
    (Msg::BalanceButton, "الرصيد"),
    (Msg::SupportButton, "الاتصال بالدعم"),
    (Msg::MainMenu, "القائمة الرئيسية:"),
    (Msg::ChooseLanguage, "اختر لغتك:"),
    (Msg::CompoundOn, "تم تفعيل تراكم الأرباح."),
    (Msg::CompoundOff, "تم إلغاء تفعيل تراكم الأرباح."),
    (Msg::NotAuthorized, "ليس لديك صلاحية لاستخدام هذا الأمر."),
    (Msg::AskName, "الرجاء إدخال اسمك الكامل:"),
    (Msg::AskEmail, "الرجاء إدخال عنوان بريدك الإلكتروني:"),
    (Msg::AskCountry, "الرجاء إدخال بلدك:"),
    (Msg::AskPayoutAddress, "الرجاء إدخال عنوان المحفظة لاستلام المدفوعات:"),
    (Msg::DetailsSaved, "تم حفظ التفاصيل. الآن اختر عملة الإيداع الخاصة بك:"),
    (Msg::ChooseCurrency, "اختر عملة الإيداع:"),
    (Msg::AskTxId, "الرجاء إدخال معرّف المعاملة:"),
    (
        Msg::InvalidTxId,
        "تعذر تأكيد المعاملة. الرجاء التحقق من المعرّف والمحاولة مرة أخرى:",
    ),
    (
        Msg::TxIdReceived,
        "تم تأكيد المعاملة {txid}.\nالإيداع المسجل لخطتك هو {amount}.\nالرجاء التأكيد.",
    ),
    (
        Msg::DepositConfirmed,
        "تم تسجيل إيداع بقيمة {amount}. الرجاء إرسال عنوان المحفظة لاستلام المدفوعات:",
    ),
    (Msg::Activated, "حسابك نشط."),
];

const HI: Table = &[
    (Msg::Welcome, "आपका स्वागत है! कृपया एक विकल्प चुनें:"),
    (Msg::PlansButton, "प्लान"),
    (Msg::BalanceButton, "बैलेंस"),
    (Msg::SupportButton, "सपोर्ट से संपर्क करें"),
    (Msg::MainMenu, "मुख्य मेन्यू:"),
    (Msg::ChooseLanguage, "अपनी भाषा चुनें:"),
    (Msg::CompoundOn, "कम्पाउंड प्रॉफिट सक्रिय किया गया।"),
    (Msg::CompoundOff, "कम्पाउंड प्रॉफिट निष्क्रिय किया गया।"),
    (Msg::NotAuthorized, "आप इस कमांड का उपयोग करने के लिए अधिकृत नहीं हैं।"),
    (Msg::AskName, "कृपया अपना पूरा नाम दर्ज करें:"),
    (Msg::AskEmail, "कृपया अपना ईमेल पता दर्ज करें:"),
    (Msg::AskCountry, "कृपया अपना देश दर्ज करें:"),
    (Msg::AskPayoutAddress, "कृपया भुगतान के लिए वॉलेट एड्रेस दर्ज करें:"),
    (Msg::DetailsSaved, "विवरण सहेजे गए। अब अपनी जमा मुद्रा चुनें:"),
    (Msg::ChooseCurrency, "अपनी जमा मुद्रा चुनें:"),
    (Msg::AskTxId, "कृपया अपना ट्रांजैक्शन ID दर्ज करें:"),
    (
        Msg::InvalidTxId,
        "ट्रांजैक्शन की पुष्टि नहीं हो सकी। कृपया ID जांचें और पुनः प्रयास करें:",
    ),
    (
        Msg::TxIdReceived,
        "ट्रांजैक्शन {txid} की पुष्टि हो गई है।\nआपके प्लान के लिए दर्ज डिपॉजिट {amount} है।\nकृपया पुष्टि करें।",
    ),
    (
        Msg::DepositConfirmed,
        "{amount} का डिपॉजिट दर्ज किया गया। कृपया भुगतान के लिए वॉलेट एड्रेस भेजें:",
    ),
    (Msg::Activated, "आपका खाता सक्रिय है।"),
];

const ZH: Table = &[
    (Msg::Welcome, "欢迎！请选择一个选项："),
    (Msg::PlansButton, "方案"),
    (Msg::BalanceButton, "余额"),
    (Msg::SupportButton, "联系客服"),
    (Msg::MainMenu, "主菜单："),
    (Msg::ChooseLanguage, "请选择您的语言："),
    (Msg::CompoundOn, "复利已激活。"),
    (Msg::CompoundOff, "复利已停用。"),
    (Msg::NotAuthorized, "您无权使用此命令。"),
    (Msg::AskName, "请输入您的全名："),
    (Msg::AskEmail, "请输入您的电子邮件地址："),
    (Msg::AskCountry, "请输入您的国家："),
    (Msg::AskPayoutAddress, "请输入用于收款的钱包地址："),
    (Msg::DetailsSaved, "详情已保存。现在选择您的存款货币："),
    (Msg::ChooseCurrency, "选择您的存款货币："),
    (Msg::ChooseNetwork, "选择 USDT 网络："),
    (Msg::AskTxId, "请输入您的交易ID："),
    (Msg::InvalidTxId, "无法确认该交易。请检查交易ID后重试："),
    (
        Msg::TxIdReceived,
        "交易 {txid} 已确认。\n您的方案记录的存款为 {amount}。\n请确认。",
    ),
    (Msg::DepositConfirmed, "已记录 {amount} 的存款。请发送用于收款的钱包地址："),
    (Msg::Activated, "您的账户已激活。"),
];

fn table(language: &str) -> Option<Table> {
    match language {
        "en" => Some(EN),
        "es" => Some(ES),
        "fr" => Some(FR),
        "de" => Some(DE),
        "ru" => Some(RU),
        "id" => Some(ID),
        "ar" => Some(AR),
        "hi" => Some(HI),
        "zh" => Some(ZH),
        _ => None,
    }
}

fn find(table: Table, key: Msg) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, text)| *text)
}

pub fn is_supported(language: &str) -> bool {
    table(language).is_some()
}

/// Localized text for `key`, falling back to English.
pub fn text(language: &str, key: Msg) -> &'static str {
    table(language)
        .and_then(|t| find(t, key))
        .or_else(|| find(EN, key))
        .unwrap_or_default()
}

/// Localized text with `{name}` placeholders substituted.
///
/// Substitution is a single left-to-right pass: inserted values are never
/// scanned again. Unknown placeholders are kept as written.
pub fn format(language: &str, key: Msg, args: &[(&str, &str)]) -> String {
    let template = text(language, key);
    let mut message = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                message.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                message.push('{');
                rest = after;
            }
        }
    }
    message.push_str(rest);
    message
}
