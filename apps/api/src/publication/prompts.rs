// Prompt constants for social post generation.
// Output contract for every platform: {"content": "...", "hashtags": ["..."]}

use crate::models::social::Platform;
use crate::publication::social::SocialBrief;

/// Per-platform system role and requirement list.
pub fn platform_brief(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::LinkedIn => (
            "Jesteś ekspertem od content marketingu B2B.",
            "Napisz profesjonalny post na LinkedIn promujący artykuł blogowy.\n\
             - Ton profesjonalny, B2B\n\
             - Długość: 150-200 słów\n\
             - Rozpocznij od pytania lub statystyki\n\
             - Podkreśl wartość biznesową\n\
             - Zakończ wezwaniem do działania\n\
             - Dodaj 3-5 hashtagów",
        ),
        Platform::Facebook => (
            "Jesteś ekspertem od social media marketingu.",
            "Napisz angażujący post na Facebook promujący artykuł blogowy.\n\
             - Ton przystępny, przyjazny\n\
             - Długość: 100-150 słów\n\
             - Rozpocznij od pytania lub ciekawostki\n\
             - Użyj 2-3 emoji i zachęć do komentowania\n\
             - Zakończ wezwaniem do działania\n\
             - Dodaj 3-5 hashtagów",
        ),
        Platform::Twitter => (
            "Jesteś ekspertem od marketingu na Twitter/X.",
            "Napisz zwięzły post na Twitter/X promujący artykuł blogowy.\n\
             - Maksymalnie 280 znaków razem z hashtagami\n\
             - Ton dynamiczny, bezpośredni, mocny hook na początku\n\
             - Użyj 1-2 emoji\n\
             - Dodaj 3-4 hashtagi",
        ),
        Platform::Instagram => (
            "Jesteś ekspertem od content marketingu na Instagramie.",
            "Napisz post na Instagram promujący artykuł blogowy.\n\
             - Ton storytelling, emocjonalny\n\
             - Długość: 150-200 słów w krótkich akapitach\n\
             - Rozpocznij od mini-historii lub scenariusza\n\
             - Użyj 3-5 emoji, link w bio\n\
             - Zakończ wezwaniem do działania\n\
             - Dodaj 5-10 hashtagów",
        ),
    }
}

pub const SOCIAL_PROMPT_TEMPLATE: &str = r#"{requirements}

Tytuł artykułu: {title}
Opis: {description}
Słowa kluczowe: {keywords}
URL: {url}

Odpowiedz wyłącznie w formacie JSON:
{"content": "treść postu", "hashtags": ["hashtag1", "hashtag2", "hashtag3"]}"#;

pub fn build_social_prompt(platform: Platform, brief: &SocialBrief) -> String {
    let (_, requirements) = platform_brief(platform);
    SOCIAL_PROMPT_TEMPLATE
        .replace("{requirements}", requirements)
        .replace("{title}", &brief.title)
        .replace("{description}", &brief.meta_description)
        .replace("{keywords}", &brief.keywords.join(", "))
        .replace("{url}", &brief.url)
}
