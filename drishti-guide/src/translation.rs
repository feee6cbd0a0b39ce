//! Display names and spoken phrases for each narration language

use drishti_core::{Direction, Language, Urgency, Zone};
use std::collections::HashMap;

const ENGLISH_NAMES: &[(&str, &str)] = &[
    ("person", "Person"),
    ("bicycle", "Bicycle"),
    ("car", "Car"),
    ("motorcycle", "Motorcycle"),
    ("airplane", "Airplane"),
    ("bus", "Bus"),
    ("train", "Train"),
    ("truck", "Truck"),
    ("boat", "Boat"),
    ("traffic light", "Traffic light"),
    ("fire hydrant", "Fire hydrant"),
    ("stop sign", "Stop sign"),
    ("parking meter", "Parking meter"),
    ("bench", "Bench"),
    ("bird", "Bird"),
    ("cat", "Cat"),
    ("dog", "Dog"),
    ("horse", "Horse"),
    ("sheep", "Sheep"),
    ("cow", "Cow"),
    ("elephant", "Elephant"),
    ("bear", "Bear"),
    ("zebra", "Zebra"),
    ("giraffe", "Giraffe"),
    ("backpack", "Backpack"),
    ("umbrella", "Umbrella"),
    ("handbag", "Handbag"),
    ("tie", "Tie"),
    ("suitcase", "Suitcase"),
    ("frisbee", "Frisbee"),
    ("skis", "Skis"),
    ("snowboard", "Snowboard"),
    ("sports ball", "Sports ball"),
    ("kite", "Kite"),
    ("baseball bat", "Baseball bat"),
    ("baseball glove", "Baseball glove"),
    ("skateboard", "Skateboard"),
    ("surfboard", "Surfboard"),
    ("tennis racket", "Tennis racket"),
    ("bottle", "Bottle"),
    ("wine glass", "Wine glass"),
    ("cup", "Cup"),
    ("fork", "Fork"),
    ("knife", "Knife"),
    ("spoon", "Spoon"),
    ("bowl", "Bowl"),
    ("banana", "Banana"),
    ("apple", "Apple"),
    ("sandwich", "Sandwich"),
    ("orange", "Orange"),
    ("broccoli", "Broccoli"),
    ("carrot", "Carrot"),
    ("hot dog", "Hot dog"),
    ("pizza", "Pizza"),
    ("donut", "Donut"),
    ("cake", "Cake"),
    ("chair", "Chair"),
    ("couch", "Couch"),
    ("potted plant", "Potted plant"),
    ("bed", "Bed"),
    ("dining table", "Dining table"),
    ("toilet", "Toilet"),
    ("tv", "TV"),
    ("laptop", "Laptop"),
    ("mouse", "Mouse"),
    ("remote", "Remote"),
    ("keyboard", "Keyboard"),
    ("cell phone", "Cell phone"),
    ("microwave", "Microwave"),
    ("oven", "Oven"),
    ("toaster", "Toaster"),
    ("sink", "Sink"),
    ("refrigerator", "Refrigerator"),
    ("book", "Book"),
    ("clock", "Clock"),
    ("vase", "Vase"),
    ("scissors", "Scissors"),
    ("teddy bear", "Teddy bear"),
    ("hair drier", "Hair drier"),
    ("toothbrush", "Toothbrush"),
];

const TAMIL_NAMES: &[(&str, &str)] = &[
    ("person", "நபர்"),
    ("bicycle", "மிதிவண்டி"),
    ("car", "கார்"),
    ("motorcycle", "மோட்டார் சைக்கிள்"),
    ("bus", "பேருந்து"),
    ("truck", "லாரி"),
    ("traffic light", "போக்குவரத்து விளக்கு"),
    ("stop sign", "நிறுத்து அடையாளம்"),
    ("bench", "பெஞ்ச்"),
    ("bird", "பறவை"),
    ("cat", "பூனை"),
    ("dog", "நாய்"),
    ("chair", "நாற்காலி"),
    ("cell phone", "கைபேசி"),
    ("bottle", "பாட்டில்"),
    ("laptop", "மடிக்கணினி"),
    ("tv", "தொலைக்காட்சி"),
    ("backpack", "முதுகுப்பை"),
    ("umbrella", "குடை"),
    ("handbag", "கைப்பை"),
    ("tie", "டை"),
    ("suitcase", "பெட்டி"),
    ("cup", "கோப்பை"),
    ("fork", "முள் கரண்டி"),
    ("knife", "கத்தி"),
    ("spoon", "கரண்டி"),
    ("bowl", "கிண்ணம்"),
    ("banana", "வாழைப்பழம்"),
    ("apple", "ஆப்பிள்"),
    ("sandwich", "சாண்ட்விச்"),
    ("orange", "ஆரஞ்சு"),
    ("broccoli", "ப்ரோக்கோலி"),
    ("carrot", "கேரட்"),
    ("pizza", "பீட்சா"),
    ("donut", "டோனட்"),
    ("cake", "கேக்"),
    ("bed", "படுக்கை"),
    ("dining table", "உணவு மேசை"),
    ("toilet", "கழிப்பறை"),
    ("mouse", "மவுஸ்"),
    ("remote", "ரிமோட்"),
    ("keyboard", "விசைப்பலகை"),
    ("book", "புத்தகம்"),
    ("clock", "கடிகாரம்"),
    ("vase", "பூச்சாடி"),
    ("scissors", "கத்தரிக்கோல்"),
    ("toothbrush", "பல் துலக்கி"),
];

/// Labels that fall back to a broader category when not translated directly
/// Classes narrated as oncoming traffic
const VEHICLES: &[&str] = &["car", "truck", "bus", "motorcycle", "bicycle", "train"];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("dog", &["dog", "terrier", "retriever", "shepherd", "hound", "pug", "beagle"]),
    ("cat", &["cat", "kitten", "tabby"]),
    ("bird", &["bird", "eagle", "owl", "parrot"]),
];

/// Class-label translations plus the fixed phrases announcements are built from
pub struct TranslationTable {
    names: HashMap<Language, HashMap<String, String>>,
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TranslationTable {
    /// Table with the bundled English and Tamil names
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (label, name) in ENGLISH_NAMES {
            table.insert(Language::English, label, *name);
        }
        for (label, name) in TAMIL_NAMES {
            table.insert(Language::Tamil, label, *name);
        }
        table
    }

    pub fn empty() -> Self {
        Self { names: HashMap::new() }
    }

    pub fn insert(&mut self, language: Language, label: &str, name: impl Into<String>) {
        self.names
            .entry(language)
            .or_default()
            .insert(normalize(label), name.into());
    }

    /// Display name for a class label. Unknown breeds and species fall back
    /// to their category; anything else comes back as the raw label.
    pub fn lookup(&self, label: &str, language: Language) -> String {
        let key = normalize(label);
        let Some(names) = self.names.get(&language) else {
            return label.to_string();
        };

        if let Some(name) = names.get(&key) {
            return name.clone();
        }

        CATEGORIES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| key.contains(k)))
            .and_then(|(category, _)| names.get(*category))
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    pub fn zone(&self, zone: Zone, language: Language) -> &'static str {
        match (language, zone) {
            (Language::English, Zone::FarLeft) => "on your far left",
            (Language::English, Zone::Left) => "on your left",
            (Language::English, Zone::Center) => "ahead",
            (Language::English, Zone::Right) => "on your right",
            (Language::English, Zone::FarRight) => "on your far right",
            (Language::Tamil, Zone::FarLeft) => "இடது ஓரத்தில்",
            (Language::Tamil, Zone::Left) => "இடது பக்கம்",
            (Language::Tamil, Zone::Center) => "முன்னால்",
            (Language::Tamil, Zone::Right) => "வலது பக்கம்",
            (Language::Tamil, Zone::FarRight) => "வலது ஓரத்தில்",
        }
    }

    /// Avoidance instruction
    pub fn direction(&self, direction: Direction, language: Language) -> &'static str {
        match (language, direction) {
            (Language::English, Direction::Left) => "move left",
            (Language::English, Direction::Right) => "move right",
            (Language::Tamil, Direction::Left) => "இடது பக்கம் நகருங்கள்",
            (Language::Tamil, Direction::Right) => "வலது பக்கம் நகருங்கள்",
        }
    }

    pub fn caution(&self, language: Language) -> &'static str {
        match language {
            Language::English => "be very careful",
            Language::Tamil => "மிகவும் கவனமாக இருங்கள்",
        }
    }

    /// Stand-in for an object whose class is too uncertain to name
    pub fn obstacle(&self, language: Language) -> &'static str {
        match language {
            Language::English => "Obstacle",
            Language::Tamil => "தடை",
        }
    }

    pub fn welcome(&self, language: Language) -> &'static str {
        match language {
            Language::English => "AI Navigation System Started. Tap anywhere to change language.",
            Language::Tamil => "AI வழிசெலுத்தல் அமைப்பு தொடங்கியது. மொழியை மாற்ற எங்கு வேண்டுமானாலும் தட்டவும்.",
        }
    }

    /// "<name> is <zone>, <action>."
    pub fn object_sentence(&self, name: &str, zone: Zone, action: &str, language: Language) -> String {
        let zone = self.zone(zone, language);
        match language {
            Language::English => format!("{} is {}, {}.", capitalize(name), zone, action),
            Language::Tamil => format!("{} {} இருக்கிறது, {}.", zone, name, action),
        }
    }

    /// Sentence for a confidently named object. Tamil phrasing follows the
    /// urgency and, when near, whether the object is a vehicle or a person.
    pub fn named_sentence(
        &self,
        label: &str,
        name: &str,
        zone: Zone,
        urgency: Urgency,
        action: &str,
        language: Language,
    ) -> String {
        if language != Language::Tamil {
            return self.object_sentence(name, zone, action, language);
        }

        let label = normalize(label);
        let place = self.zone(zone, language);
        match urgency {
            Urgency::High => self.object_sentence(name, zone, action, language),
            Urgency::Medium if VEHICLES.contains(&label.as_str()) => {
                format!("கவனம், {} {} வருகிறது, சற்று விலகி இருங்கள், {}.", place, name, action)
            }
            Urgency::Medium if label == "person" => {
                format!("{} {} இருக்கிறார், கொஞ்சம் மெதுவாக நடக்கவும், {}.", place, name, action)
            }
            Urgency::Medium => self.object_sentence(name, zone, action, language),
            Urgency::Low => format!("{}, {} தெரிகிறது, {}.", place, name, action),
        }
    }

    /// Collision warning
    pub fn danger_sentence(&self, name: &str, zone: Zone, language: Language) -> String {
        let zone = self.zone(zone, language);
        match language {
            Language::English => format!("Warning! {} very close {}. Stop immediately.", capitalize(name), zone),
            Language::Tamil => format!(
                "கவனம், {} {} மிகவும் அருகில் இருக்கிறது, இப்போது நிறுத்துங்கள்.",
                zone, name
            ),
        }
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
