use super::{lenient_opt, lenient_opt_vec, lenient_vec};
use serde::{Deserialize, Serialize};

/// Feed types that get their own slot on the home page, or are never shown.
const EXCLUDED_FEED_TYPES: [&str; 6] = [
    "featured",
    "creator_carousel",
    "holiday_eats_made_easy",
    "popular_recipes",
    "trending",
    "budget_friendly_bites",
];

pub const POPULAR_FEED_TYPE: &str = "popular_recipes";
pub const TRENDING_FEED_TYPE: &str = "trending";

/// Tag types surfaced as browsable categories
const CATEGORY_TAG_TYPES: [&str; 2] = ["cuisine", "dietary"];

/// Classification tag, as listed by `tags/list` and attached to recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagList {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<Tag>,
}

impl TagList {
    /// Cuisine and dietary tags, in upstream order
    pub fn categories(&self) -> Vec<Category> {
        self.results
            .iter()
            .filter(|tag| CATEGORY_TAG_TYPES.contains(&tag.kind.as_str()))
            .map(|tag| Category {
                name: tag.name.clone(),
                display_name: tag.display_name.clone(),
            })
            .collect()
    }
}

/// A recipe as it appears in listings, searches and feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub num_servings: Option<u32>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<Tag>,
}

impl RecipeSummary {
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeList {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<RecipeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(default)]
    pub position: Option<u32>,
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub position: Option<u32>,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub carbohydrates: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRatings {
    #[serde(default)]
    pub count_positive: Option<u32>,
    #[serde(default)]
    pub count_negative: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Full recipe, as returned by `recipes/get-more-info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub total_time_minutes: Option<u32>,
    #[serde(default)]
    pub num_servings: Option<u32>,
    #[serde(default)]
    pub yields: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub instructions: Vec<Instruction>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sections: Vec<IngredientSection>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub user_ratings: Option<UserRatings>,
    #[serde(default)]
    pub original_video_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl RecipeDetails {
    /// Name of the first tag, used to look up related recipes
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(|tag| tag.name.as_str())
    }
}

/// Curated home page section from `feeds/list`. A section carries either a
/// single `item` or a list of `items`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSection {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub item: Option<RecipeSummary>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub items: Option<Vec<RecipeSummary>>,
}

impl FeedSection {
    /// Flatten the item-or-items shape, keeping only recipes with a thumbnail
    pub fn into_recipes(self) -> Vec<RecipeSummary> {
        let recipes = match (self.items, self.item) {
            (Some(items), _) => items,
            (None, Some(item)) => vec![item],
            (None, None) => Vec::new(),
        };

        recipes
            .into_iter()
            .filter(RecipeSummary::has_thumbnail)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedList {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<FeedSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub recipes: Vec<RecipeSummary>,
}

/// Home page listings derived from the feed sections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeData {
    pub popular: Vec<RecipeSummary>,
    pub trending: Vec<RecipeSummary>,
    pub other: Vec<HomeSection>,
}

impl HomeData {
    pub fn from_feeds(sections: Vec<FeedSection>) -> Self {
        let mut home = HomeData::default();

        for section in sections {
            let kind = section.kind.clone();

            match kind.as_str() {
                POPULAR_FEED_TYPE => home.popular.extend(section.into_recipes()),
                TRENDING_FEED_TYPE => home.trending.extend(section.into_recipes()),
                excluded if EXCLUDED_FEED_TYPES.contains(&excluded) => {}
                _ => {
                    let name = section.name.clone();
                    let recipes = section.into_recipes();

                    if !recipes.is_empty() {
                        home.other.push(HomeSection {
                            kind: kind.clone(),
                            name,
                            recipes,
                        });
                    }
                }
            }
        }

        home
    }
}
