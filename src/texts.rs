//! User-facing reply texts
//!
//! Replies are sent with HTML parse mode, so every piece of user-supplied
//! text is escaped before it is spliced into a template.

/// Localized reply templates. `{name}`-style placeholders are substituted
/// by the accessor methods.
#[derive(Debug, Clone)]
pub struct Texts {
    pub welcome: String,
    pub help: String,
    pub guess: String,
    pub correct: String,
    pub incorrect: String,
    pub example: String,
    pub no_active_round: String,
    pub no_words: String,
    pub not_enough_words: String,
    pub add_prompt: String,
    pub translation_prompt: String,
    pub delete_prompt: String,
    pub empty_input: String,
    pub too_long: String,
    pub added: String,
    pub total: String,
    pub already_owned: String,
    pub catalog_conflict: String,
    pub deleted: String,
    pub not_owned: String,
    pub unknown_word: String,
    pub word_list_header: String,
    pub word_list_empty: String,
    pub add_failed: String,
    pub delete_failed: String,
    pub list_failed: String,
    pub round_failed: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            welcome: "Привет, <b>{name}</b>.\n\
                      Давай попрактикуемся в английском языке!\n\n\
                      У тебя есть возможность использовать тренажёр, как конструктор, \
                      и собирать свою собственную базу для обучения.\n\
                      Для этого воспользуйся инструментами:\n\
                      <i>{add}</i>,\n\
                      <i>{delete}</i>.\n\n\
                      Отправь мне /help, если нужна помощь.\n\
                      Удачи! 😊"
                .to_string(),
            help: "<b>Используй команды</b> 💬:\n\
                   /start и /cards - начать обучение\n\
                   /all_words - посмотреть весь список слов\n\n\
                   <b>Используй кнопки:</b>\n\
                   <i>{add}</i>\n\
                   <i>{delete}</i>\n\
                   <i>{next}</i>\n\n\
                   Эти функции помогут тебе создать свою собственную базу данных для обучения!\n\
                   Удачи! 😊"
                .to_string(),
            guess: "Угадай слово: <b>{translation}</b>".to_string(),
            correct: "Верно! Excellent! 🌟".to_string(),
            incorrect: "Ошибка. Попробуй еще раз)".to_string(),
            example: "<b>Пример</b> 📖: <i>{example}</i>".to_string(),
            no_active_round: "Сейчас нет активного вопроса. Держи новый!".to_string(),
            no_words: "В базе нет слов. Добавьте новые слова.".to_string(),
            not_enough_words: "В базе только {available} слов(а), а для игры нужно \
                               хотя бы {required}. Добавьте новые слова."
                .to_string(),
            add_prompt: "Пожалуйста, введите английское слово, которое хотите добавить:"
                .to_string(),
            translation_prompt: "Теперь введите перевод на русский язык:".to_string(),
            delete_prompt: "Введите слово, которое хотите удалить:".to_string(),
            empty_input: "Пустое сообщение не подойдёт. Попробуйте ещё раз.".to_string(),
            too_long: "Слишком длинный текст (максимум {max} символов). Попробуйте ещё раз."
                .to_string(),
            added: "Слово '{word}' с переводом '{translation}' успешно добавлено!".to_string(),
            total: "Вы изучаете {count} слов(а). Так держать!".to_string(),
            already_owned: "Слово '{word}' уже существует в Вашей базе данных.".to_string(),
            catalog_conflict: "Слово '{word}' уже есть в словаре с переводом \
                               '{translation}'. Оно добавлено в Вашу базу с этим переводом."
                .to_string(),
            deleted: "Слово '{word}' было удалено.".to_string(),
            not_owned: "Такое слово не найдено в Вашей базе данных.".to_string(),
            unknown_word: "Такое слово не найдено в словаре.".to_string(),
            word_list_header: "Вот все слова, которые Вы изучаете:".to_string(),
            word_list_empty: "У Вас пока нет изученных слов.".to_string(),
            add_failed: "Произошла ошибка при добавлении слова. Попробуйте снова.".to_string(),
            delete_failed: "Произошла ошибка при удалении слова. Попробуйте снова.".to_string(),
            list_failed: "Произошла ошибка при получении слов. Попробуйте снова.".to_string(),
            round_failed: "Не удалось подобрать слово. Нажмите «{next}», чтобы попробовать снова."
                .to_string(),
        }
    }
}

impl Texts {
    pub fn welcome(&self, name: &str, add: &str, delete: &str) -> String {
        self.welcome
            .replace("{name}", &escape_html(name))
            .replace("{add}", &escape_html(add))
            .replace("{delete}", &escape_html(delete))
    }

    pub fn help(&self, add: &str, delete: &str, next: &str) -> String {
        self.help
            .replace("{add}", &escape_html(add))
            .replace("{delete}", &escape_html(delete))
            .replace("{next}", &escape_html(next))
    }

    pub fn guess(&self, translation: &str) -> String {
        self.guess.replace("{translation}", &escape_html(translation))
    }

    pub fn example(&self, example: &str) -> String {
        self.example.replace("{example}", &escape_html(example))
    }

    pub fn not_enough_words(&self, available: usize, required: usize) -> String {
        self.not_enough_words
            .replace("{available}", &available.to_string())
            .replace("{required}", &required.to_string())
    }

    pub fn too_long(&self, max: usize) -> String {
        self.too_long.replace("{max}", &max.to_string())
    }

    pub fn added(&self, word: &str, translation: &str) -> String {
        self.added
            .replace("{word}", &escape_html(word))
            .replace("{translation}", &escape_html(translation))
    }

    pub fn total(&self, count: usize) -> String {
        self.total.replace("{count}", &count.to_string())
    }

    pub fn already_owned(&self, word: &str) -> String {
        self.already_owned.replace("{word}", &escape_html(word))
    }

    pub fn catalog_conflict(&self, word: &str, translation: &str) -> String {
        self.catalog_conflict
            .replace("{word}", &escape_html(word))
            .replace("{translation}", &escape_html(translation))
    }

    pub fn deleted(&self, word: &str) -> String {
        self.deleted.replace("{word}", &escape_html(word))
    }

    pub fn round_failed(&self, next: &str) -> String {
        self.round_failed.replace("{next}", &escape_html(next))
    }

    /// `word: translation` lines under the list header, or the empty-list text
    pub fn word_list<'a>(&self, words: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        let mut lines = words
            .into_iter()
            .map(|(word, translation)| format!("{}: {}", escape_html(word), escape_html(translation)))
            .peekable();

        if lines.peek().is_none() {
            return self.word_list_empty.clone();
        }

        let mut response = self.word_list_header.clone();
        for line in lines {
            response.push('\n');
            response.push_str(&line);
        }
        response
    }
}

/// Escape the characters Telegram's HTML parse mode treats as markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
