use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

// violet ignore chunk
/// Common English function words excluded from the vocabulary
const STOP_WORDS: &[&str] = &[
  "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
  "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
  "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere",
  "are", "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
  "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
  "beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co", "con",
  "could", "couldnt", "cry", "de", "describe", "detail", "do", "done", "down", "due", "during",
  "each", "eg", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
  "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen", "fifty",
  "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty", "found", "four",
  "from", "front", "full", "further", "get", "give", "go", "had", "has", "hasnt", "have", "he",
  "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him",
  "himself", "his", "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed",
  "interest", "into", "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least",
  "less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more",
  "moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely",
  "neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
  "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
  "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
  "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming",
  "seems", "serious", "several", "she", "should", "show", "side", "since", "sincere", "six",
  "sixty", "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
  "still", "such", "system", "take", "ten", "than", "that", "the", "their", "them", "themselves",
  "then", "thence", "there", "thereafter", "thereby", "therefore", "therein", "thereupon", "these",
  "they", "thick", "thin", "third", "this", "those", "though", "three", "through", "throughout",
  "thru", "thus", "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two",
  "un", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
  "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein",
  "whereupon", "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole",
  "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
  "yours", "yourself", "yourselves",
];

/// Words of two or more word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

fn token_regex() -> &'static Regex {
  static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
  TOKEN_REGEX.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

fn stop_words() -> &'static HashSet<&'static str> {
  static STOP_WORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
  STOP_WORD_SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(word: &str) -> bool {
  stop_words().contains(word)
}

/// Lowercase `text` and split it into indexable terms, keeping repeats and order
pub fn tokenize(text: &str) -> Vec<String> {
  let lowered = text.to_lowercase();

  token_regex()
    .find_iter(&lowered)
    .map(|m| m.as_str())
    .filter(|word| !is_stop_word(word))
    .map(str::to_string)
    .collect()
}
