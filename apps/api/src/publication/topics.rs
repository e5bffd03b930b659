//! SEO topic generation from the shop catalogue, plus a curated evergreen set.

use crate::cms::{CmsCategory, CmsProduct};
use crate::generation::outline::{ArticleOutline, Category};
use crate::models::topic::NewTopic;

const MAX_CATEGORY_TOPICS: usize = 5;
const MAX_PRODUCTS_PER_CATEGORY: usize = 3;
const MAX_PRODUCT_TOPICS: usize = 5;

const GUIDE_TARGET_LENGTH: u32 = 2000;
const REVIEW_TARGET_LENGTH: u32 = 1800;

/// Rough keyword competition by phrase length: short heads are contested,
/// long tails are not.
pub fn estimate_seo_difficulty(keyword: &str) -> i32 {
    match keyword.split_whitespace().count() {
        1 => 75,
        2 => 50,
        _ => 30,
    }
}

/// Higher is better: easy keywords and many linkable products.
pub fn topic_score(topic: &NewTopic) -> i32 {
    (100 - topic.seo_difficulty) + 10 * topic.related_products.len() as i32
}

/// Index of the best-scoring topic. First seen wins ties.
pub fn select_best_topic(topics: &[NewTopic]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (i, topic) in topics.iter().enumerate() {
        let score = topic_score(topic);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Guide topics for categories that have products, then review topics for
/// the first products in the catalogue.
pub fn topics_from_catalog(products: &[CmsProduct], categories: &[CmsCategory]) -> Vec<NewTopic> {
    let mut topics = Vec::new();

    for category in categories.iter().take(MAX_CATEGORY_TOPICS) {
        let related: Vec<String> = products
            .iter()
            .filter(|p| p.category == category.name)
            .take(MAX_PRODUCTS_PER_CATEGORY)
            .map(|p| p.name.clone())
            .collect();
        if !related.is_empty() {
            topics.push(category_guide(&category.name, related));
        }
    }

    for product in products.iter().take(MAX_PRODUCT_TOPICS) {
        topics.push(product_review(&product.name));
    }

    topics
}

fn category_guide(name: &str, related_products: Vec<String>) -> NewTopic {
    let lower = name.to_lowercase();
    let title = format!("Przewodnik po {name}: Wszystko co musisz wiedzieć");
    let category = Category::infer_from_name(name);

    let outline_keywords = vec![
        lower.clone(),
        format!("{lower} przewodnik"),
        format!("najlepsze {lower}"),
    ];
    let mut keywords = outline_keywords.clone();
    keywords.extend(related_products.iter().map(|p| p.to_lowercase()));

    NewTopic {
        topic_name: title.clone(),
        category,
        keywords,
        seo_difficulty: estimate_seo_difficulty(name),
        outline: ArticleOutline {
            topic: title,
            keywords: outline_keywords,
            target_length: GUIDE_TARGET_LENGTH,
            sections: vec![
                "Wprowadzenie".to_string(),
                format!("Czym jest {name}?"),
                "Najważniejsze cechy i korzyści".to_string(),
                "Jak wybrać odpowiedni produkt".to_string(),
                "Najlepsze produkty w kategorii".to_string(),
                "Podsumowanie i rekomendacje".to_string(),
            ],
            category,
        },
        related_products,
    }
}

fn product_review(name: &str) -> NewTopic {
    let lower = name.to_lowercase();
    let title = format!("{name}: Kompletny przegląd i recenzja");
    let category = Category::infer_from_name(name);

    NewTopic {
        topic_name: title.clone(),
        category,
        keywords: vec![
            lower.clone(),
            format!("{lower} recenzja"),
            format!("{lower} opinie"),
            format!("{lower} cena"),
        ],
        seo_difficulty: estimate_seo_difficulty(name),
        related_products: vec![name.to_string()],
        outline: ArticleOutline {
            topic: title,
            keywords: vec![
                lower.clone(),
                format!("{lower} recenzja"),
                format!("{lower} opinie"),
            ],
            target_length: REVIEW_TARGET_LENGTH,
            sections: vec![
                "Wprowadzenie".to_string(),
                format!("Czym jest {name}?"),
                "Główne funkcje i specyfikacja".to_string(),
                "Zalety i wady".to_string(),
                "Dla kogo jest ten produkt?".to_string(),
                "Podsumowanie i werdykt".to_string(),
            ],
            category,
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Hand-picked evergreen topics, independent of the catalogue.
pub fn trending_topics() -> Vec<NewTopic> {
    let category = Category::ReactivePowerCompensation;
    vec![
        NewTopic {
            topic_name: "Jak zwiększyć efektywność energetyczną w domu".to_string(),
            category,
            keywords: strings(&[
                "efektywność energetyczna",
                "oszczędzanie energii",
                "energia w domu",
                "ekologiczny dom",
            ]),
            seo_difficulty: 45,
            related_products: vec![],
            outline: ArticleOutline {
                topic: "Jak zwiększyć efektywność energetyczną w domu".to_string(),
                keywords: strings(&["efektywność energetyczna", "oszczędzanie energii"]),
                target_length: 2200,
                sections: strings(&[
                    "Wprowadzenie",
                    "Dlaczego efektywność energetyczna jest ważna?",
                    "Najlepsze sposoby na oszczędzanie energii",
                    "Nowoczesne technologie energooszczędne",
                    "Koszty i zwrot z inwestycji",
                    "Podsumowanie",
                ]),
                category,
            },
        },
        NewTopic {
            topic_name: "Odnawialne źródła energii dla domu - kompletny przewodnik".to_string(),
            category,
            keywords: strings(&[
                "odnawialne źródła energii",
                "panele słoneczne",
                "energia słoneczna",
                "fotowoltaika",
            ]),
            seo_difficulty: 55,
            related_products: vec![],
            outline: ArticleOutline {
                topic: "Odnawialne źródła energii dla domu - kompletny przewodnik".to_string(),
                keywords: strings(&["odnawialne źródła energii", "panele słoneczne"]),
                target_length: 2500,
                sections: strings(&[
                    "Wprowadzenie",
                    "Rodzaje odnawialnych źródeł energii",
                    "Panele słoneczne - jak działają?",
                    "Koszty instalacji i dotacje",
                    "Zwrot z inwestycji",
                    "Podsumowanie i rekomendacje",
                ]),
                category,
            },
        },
    ]
}
