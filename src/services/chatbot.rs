use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{info, warn};

use super::gemini::{ChatBackend, RemoteError};
use super::translator::{Language, Translator};

const PHONE: &str = "+213558357689";
const EMAIL: &str = "SAIDJ.MOHAMED@GMAIL.COM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Services,
    Appointment,
    Location,
    Fees,
    Unknown,
}

// Scanned in order; the first group with a hit wins.
fn keyword_groups(lang: Language) -> &'static [(Intent, &'static [&'static str])] {
    match lang {
        Language::Ar => &[
            (Intent::Services, &["اختصاص", "خدم", "مجال"]),
            (Intent::Appointment, &["موعد", "حجز"]),
            (Intent::Location, &["موقع", "عنوان", "أين"]),
            (Intent::Fees, &["تكلف", "سعر", "أتعاب"]),
        ],
        Language::Fr => &[
            (Intent::Services, &["spécialis", "domaine", "service"]),
            (Intent::Appointment, &["rendez-vous", "rdv", "appointment"]),
            (Intent::Location, &["adresse", "où", "situé", "localisation"]),
            (Intent::Fees, &["tarif", "honoraire", "prix", "coût", "combien"]),
        ],
        Language::En => &[
            (Intent::Services, &["speciali", "area", "service"]),
            (Intent::Appointment, &["appointment", "meeting", "book"]),
            (Intent::Location, &["where", "address", "location"]),
            (Intent::Fees, &["fee", "cost", "price", "how much"]),
        ],
    }
}

pub fn detect_intent(msg: &str, lang: Language) -> Intent {
    let msg_lower = msg.to_lowercase();

    keyword_groups(lang)
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| msg_lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Unknown)
}

pub fn canned_reply(intent: Intent, lang: Language) -> String {
    use Intent::*;

    match (lang, intent) {
        (Language::Ar, Services) => format!(
            "نحن نتخصص في مختلف فروع القانون:\n\n📜 القانون المدني\n👪 قانون الأسرة\n💼 القانون التجاري\n⚖️ القانون الجزائي\n🏢 القانون الإداري\n🏠 القانون العقاري\n\nللحصول على استشارة مفصلة، تواصل معنا:\n📞 {PHONE}\n📧 {EMAIL}"
        ),
        (Language::Ar, Appointment) => format!(
            "يمكنك حجز موعد لاستشارة بعدة طرق:\n\n📞 اتصال مباشر: {PHONE}\n📱 واتساب: {PHONE}\n📧 بريد إلكتروني: {EMAIL}\n\nأوقات العمل: السبت إلى الخميس من 9ص إلى 5م"
        ),
        (Language::Ar, Location) => format!(
            "مكتبنا يقع في:\n📍 12 شارع الإخوة بوعدو\nبئر مراد رايس، الجزائر\n(مقابل المحكمة الإدارية)\n\nللوصول إلينا:\n📞 {PHONE}\n📱 واتساب: {PHONE}"
        ),
        (Language::Ar, Fees) => format!(
            "تختلف أتعاب المحاماة حسب نوع وتعقيد القضية.\n\n🔍 الاستشارة الأولى: رسوم رمزية\n💼 التمثيل القانوني: حسب القضية\n\nلمعرفة التفاصيل الدقيقة، اتصل بنا:\n📞 {PHONE}"
        ),
        (Language::Ar, Unknown) => format!(
            "شكراً لك على تواصلك معنا! 😊\n\nللحصول على إجابة دقيقة ومفصلة عن استفسارك، يرجى التواصل معنا مباشرة:\n\n📞 الهاتف: {PHONE}\n📱 واتساب: {PHONE}\n📧 البريد: {EMAIL}\n📍 العنوان: 12 شارع الإخوة بوعدو، بئر مراد رايس\n\nالأستاذ سايج محمد في خدمتك 👍"
        ),

        (Language::Fr, Services) => format!(
            "Nos domaines de spécialité incluent:\n\n📜 Droit Civil\n👪 Droit de la Famille\n💼 Droit Commercial\n⚖️ Droit Pénal\n🏢 Droit Administratif\n🏠 Droit Immobilier\n\nPour une consultation détaillée, contactez-nous:\n📞 {PHONE}\n📧 {EMAIL}"
        ),
        (Language::Fr, Appointment) => format!(
            "Vous pouvez prendre rendez-vous de plusieurs façons:\n\n📞 Appel direct: {PHONE}\n📱 WhatsApp: {PHONE}\n📧 Email: {EMAIL}\n\nHeures d'ouverture: Samedi-Jeudi 9h-17h"
        ),
        (Language::Fr, Location) => format!(
            "Notre cabinet se trouve au:\n📍 12 Rue des Frères Bouaddou\nBir Mourad Raïs, Alger\n(en face du tribunal administratif)\n\nPour nous joindre:\n📞 {PHONE}\n📱 WhatsApp: {PHONE}"
        ),
        (Language::Fr, Fees) => format!(
            "Les honoraires varient selon la nature et la complexité de l'affaire.\n\n🔍 Première consultation: tarif symbolique\n💼 Représentation: selon le dossier\n\nPour un devis précis, appelez-nous:\n📞 {PHONE}"
        ),
        (Language::Fr, Unknown) => format!(
            "Merci de nous contacter! 😊\n\nPour une réponse précise à votre question, veuillez nous contacter directement:\n\n📞 Téléphone: {PHONE}\n📱 WhatsApp: {PHONE}\n📧 Email: {EMAIL}\n📍 Adresse: 12 Rue des Frères Bouaddou, Bir Mourad Raïs\n\nMaître Saidj Mohamed à votre service 👍"
        ),

        (Language::En, Services) => format!(
            "Our areas of expertise include:\n\n📜 Civil Law\n👪 Family Law\n💼 Commercial Law\n⚖️ Criminal Law\n🏢 Administrative Law\n🏠 Real Estate Law\n\nFor detailed consultation, contact us:\n📞 {PHONE}\n📧 {EMAIL}"
        ),
        (Language::En, Appointment) => format!(
            "You can book an appointment in several ways:\n\n📞 Direct call: {PHONE}\n📱 WhatsApp: {PHONE}\n📧 Email: {EMAIL}\n\nOffice hours: Saturday-Thursday 9am-5pm"
        ),
        (Language::En, Location) => format!(
            "Our office is located at:\n📍 12 Frères Bouaddou Street\nBir Mourad Raïs, Algiers\n(opposite the Administrative Court)\n\nTo reach us:\n📞 {PHONE}\n📱 WhatsApp: {PHONE}"
        ),
        (Language::En, Fees) => format!(
            "Legal fees vary with the type and complexity of the case.\n\n🔍 First consultation: nominal fee\n💼 Legal representation: depends on the case\n\nFor an exact quote, call us:\n📞 {PHONE}"
        ),
        (Language::En, Unknown) => format!(
            "Thank you for contacting us! 😊\n\nFor a precise answer to your inquiry, please contact us directly:\n\n📞 Phone: {PHONE}\n📱 WhatsApp: {PHONE}\n📧 Email: {EMAIL}\n📍 Address: 12 Frères Bouaddou Street, Bir Mourad Raïs\n\nMr. Saidj Mohamed at your service 👍"
        ),
    }
}

/// Keyword-matched reply used whenever the remote model is not reachable.
pub fn fallback_reply(utterance: &str, lang: Language) -> String {
    canned_reply(detect_intent(utterance, lang), lang)
}

/// Why a reply came from the canned table instead of the remote model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    #[serde(rename = "api_key")]
    MissingCredential,
    RateLimit,
    Network,
    General,
}

impl FailureKind {
    /// The remote model was asked and failed, as opposed to never being asked.
    pub fn is_remote(self) -> bool {
        !matches!(self, FailureKind::MissingCredential)
    }
}

impl From<&RemoteError> for FailureKind {
    fn from(err: &RemoteError) -> Self {
        match err {
            RemoteError::RateLimited => FailureKind::RateLimit,
            RemoteError::Network(_) => FailureKind::Network,
            RemoteError::Status { .. } | RemoteError::Malformed(_) | RemoteError::Empty => {
                FailureKind::General
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Remote,
    Fallback(FailureKind),
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
}

impl ChatReply {
    pub fn failure(&self) -> Option<FailureKind> {
        match self.source {
            ReplySource::Remote => None,
            ReplySource::Fallback(kind) => Some(kind),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one, on rate limiting only.
    pub max_retries: u32,
    /// Wait before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Answers chat utterances: remote model first, canned replies otherwise.
#[derive(Clone)]
pub struct ChatResponder {
    backend: Option<Arc<dyn ChatBackend>>,
    translator: Arc<Translator>,
    retry: RetryPolicy,
}

impl ChatResponder {
    pub fn new(
        backend: Option<Arc<dyn ChatBackend>>,
        translator: Arc<Translator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            translator,
            retry,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn respond(&self, utterance: &str, lang: Language) -> String {
        self.respond_detailed(utterance, lang).await.text
    }

    pub async fn respond_detailed(&self, utterance: &str, lang: Language) -> ChatReply {
        let Some(backend) = &self.backend else {
            return fallback(utterance, lang, FailureKind::MissingCredential);
        };

        let system_prompt = self.translator.text("chatbot_system_instruction", lang);
        let mut retries = 0;

        loop {
            match backend.generate(&system_prompt, utterance).await {
                Ok(text) => {
                    info!(backend = backend.name(), retries, "remote chat reply");
                    return ChatReply {
                        text,
                        source: ReplySource::Remote,
                    };
                }
                Err(err) if err.is_retryable() && retries < self.retry.max_retries => {
                    retries += 1;
                    let wait = self.retry.backoff * retries;
                    warn!("{} attempt {retries} rate limited, retrying in {wait:?}", backend.name());
                    tokio::time::sleep(wait).await;
                }
                Err(err) => {
                    warn!("{} failed after {} attempt(s): {err}", backend.name(), retries + 1);
                    return fallback(utterance, lang, FailureKind::from(&err));
                }
            }
        }
    }
}

fn fallback(utterance: &str, lang: Language, reason: FailureKind) -> ChatReply {
    ChatReply {
        text: fallback_reply(utterance, lang),
        source: ReplySource::Fallback(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_groups_follow_priority() {
        assert_eq!(detect_intent("ما هي مجالات اختصاصكم؟", Language::Ar), Intent::Services);
        assert_eq!(detect_intent("أريد حجز موعد", Language::Ar), Intent::Appointment);
        assert_eq!(detect_intent("أين يقع المكتب؟", Language::Ar), Intent::Location);
        assert_eq!(detect_intent("كم تكلفة الاستشارة؟", Language::Ar), Intent::Fees);
        assert_eq!(detect_intent("مرحبا", Language::Ar), Intent::Unknown);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_intent("Can I BOOK a slot?", Language::En), Intent::Appointment);
        assert_eq!(detect_intent("Prendre un RDV", Language::Fr), Intent::Appointment);
    }

    #[test]
    fn keywords_are_per_language() {
        // English keyword in an Arabic conversation does not match.
        assert_eq!(detect_intent("appointment", Language::Ar), Intent::Unknown);
    }

    #[test]
    fn generic_reply_has_contact_details() {
        for lang in Language::ALL {
            let reply = canned_reply(Intent::Unknown, lang);
            assert!(reply.contains(PHONE));
            assert!(reply.contains(EMAIL));
        }
    }
}
