use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::entities::Language;

#[rustfmt::skip]
const ENTRIES: &[(&str, [&str; 3])] = &[
    // key                          en, ru, hi
    ("app.title",                   ["Tirtha", "Тиртха", "तीर्थ"]),
    ("nav.home",                    ["Home", "Главная", "मुख्य पृष्ठ"]),
    ("nav.cities",                  ["Cities", "Города", "शहर"]),
    ("nav.profile",                 ["Profile", "Профиль", "प्रोफ़ाइल"]),
    ("nav.search",                  ["Search", "Поиск", "खोज"]),
    ("nav.auth",                    ["Sign in", "Войти", "साइन इन"]),

    ("common.loading",              ["Loading…", "Загрузка…", "लोड हो रहा है…"]),
    ("common.not_found",            ["Not found", "Не найдено", "नहीं मिला"]),
    ("common.no_items",             ["No items", "Нет записей", "कोई प्रविष्टि नहीं"]),
    ("common.favorite",             ["Favorite", "Избранное", "पसंदीदा"]),

    ("home.welcome",                ["Discover holy places", "Откройте святые места", "पवित्र स्थानों की खोज करें"]),
    ("home.cities",                 ["Cities", "Города", "शहर"]),
    ("home.events",                 ["Upcoming events", "Ближайшие события", "आगामी कार्यक्रम"]),

    ("city.tab.points",             ["Places", "Места", "स्थान"]),
    ("city.tab.routes",             ["Routes", "Маршруты", "मार्ग"]),
    ("city.tab.events",             ["Events", "События", "कार्यक्रम"]),
    ("city.tab.map",                ["Map", "Карта", "नक्शा"]),
    ("city.counts.points",          ["places", "мест", "स्थान"]),
    ("city.counts.routes",          ["routes", "маршрутов", "मार्ग"]),
    ("city.counts.events",          ["events", "событий", "कार्यक्रम"]),

    ("point.kind.temple",           ["Temple", "Храм", "मंदिर"]),
    ("point.kind.ashram",           ["Ashram", "Ашрам", "आश्रम"]),
    ("point.kind.kund",             ["Kund", "Кунд", "कुंड"]),
    ("point.kind.other",            ["Place", "Место", "स्थान"]),
    ("point.routes",                ["Routes through this place", "Маршруты через это место", "इस स्थान से गुजरने वाले मार्ग"]),
    ("point.events",                ["Events at this place", "События в этом месте", "इस स्थान के कार्यक्रम"]),

    ("route.points",                ["Stops", "Остановки", "पड़ाव"]),
    ("route.events",                ["Events on this route", "События на маршруте", "इस मार्ग के कार्यक्रम"]),
    ("route.distance",              ["Distance, km", "Расстояние, км", "दूरी, कि.मी."]),
    ("route.duration",              ["Duration, min", "Длительность, мин", "अवधि, मिनट"]),

    ("event.points",                ["Places", "Места", "स्थान"]),
    ("event.schedule.calendar",     ["Calendar event", "Событие по календарю", "कैलेंडर कार्यक्रम"]),
    ("event.schedule.daily",        ["Daily", "Ежедневно", "प्रतिदिन"]),
    ("event.starts",                ["Starts", "Начало", "आरंभ"]),
    ("event.ends",                  ["Ends", "Окончание", "समाप्ति"]),
    ("event.past",                  ["This event is over", "Событие завершилось", "यह कार्यक्रम समाप्त हो चुका है"]),

    ("favorites.added",             ["Added to favorites", "Добавлено в избранное", "पसंदीदा में जोड़ा गया"]),
    ("favorites.already",           ["Already in favorites", "Уже в избранном", "पहले से पसंदीदा में है"]),
    ("favorites.removed",           ["Removed from favorites", "Удалено из избранного", "पसंदीदा से हटाया गया"]),
    ("favorites.not_favorite",      ["Not in favorites", "Нет в избранном", "पसंदीदा में नहीं है"]),
    ("favorites.sign_in_required",  ["Sign in to save favorites", "Войдите, чтобы сохранять избранное", "पसंदीदा सहेजने के लिए साइन इन करें"]),
    ("favorites.error",             ["Favorites could not be updated", "Не удалось обновить избранное", "पसंदीदा अपडेट नहीं हो सका"]),

    ("auth.sign_in",                ["Sign in", "Войти", "साइन इन"]),
    ("auth.sign_up",                ["Sign up", "Регистрация", "साइन अप"]),
    ("auth.sign_out",               ["Sign out", "Выйти", "साइन आउट"]),
    ("auth.email",                  ["Email", "Эл. почта", "ईमेल"]),
    ("auth.password",               ["Password", "Пароль", "पासवर्ड"]),
    ("auth.google",                 ["Continue with Google", "Войти через Google", "Google से जारी रखें"]),
    ("auth.apple",                  ["Continue with Apple", "Войти через Apple", "Apple से जारी रखें"]),
    ("auth.signed_in",              ["Signed in", "Вы вошли", "साइन इन हो गया"]),
    ("auth.signed_out",             ["Signed out", "Вы вышли", "साइन आउट हो गया"]),
    ("auth.confirmation_sent",      ["Check your email to confirm the account", "Проверьте почту для подтверждения", "खाते की पुष्टि के लिए ईमेल देखें"]),
    ("auth.invalid_credentials",    ["Wrong email or password", "Неверная почта или пароль", "गलत ईमेल या पासवर्ड"]),
    ("auth.user_exists",            ["This email is already registered", "Эта почта уже зарегистрирована", "यह ईमेल पहले से पंजीकृत है"]),
    ("auth.email_not_confirmed",    ["Email is not confirmed yet", "Почта ещё не подтверждена", "ईमेल की पुष्टि अभी नहीं हुई है"]),
    ("auth.error",                  ["Authentication failed", "Ошибка авторизации", "प्रमाणीकरण विफल"]),

    ("map.token_required",          ["A map access token is required to show the map", "Для отображения карты нужен токен доступа", "नक्शा दिखाने के लिए एक्सेस टोकन आवश्यक है"]),
    ("map.token_saved",             ["Map token saved", "Токен карты сохранён", "नक्शा टोकन सहेजा गया"]),

    ("search.query",                ["Search for", "Поиск", "खोजें"]),
    ("search.no_results",           ["Nothing found", "Ничего не найдено", "कुछ नहीं मिला"]),
    ("search.empty_query",          ["Enter a search term", "Введите запрос", "खोज शब्द दर्ज करें"]),

    ("profile.favorites",           ["Favorites", "Избранное", "पसंदीदा"]),
    ("profile.owned_points",        ["My places", "Мои места", "मेरे स्थान"]),
    ("profile.owned_events",        ["My events", "Мои события", "मेरे कार्यक्रम"]),
    ("profile.sign_in_required",    ["Sign in to see your profile", "Войдите, чтобы открыть профиль", "प्रोफ़ाइल देखने के लिए साइन इन करें"]),

    ("language.title",              ["Language", "Язык", "भाषा"]),
    ("language.changed",            ["Language changed", "Язык изменён", "भाषा बदल दी गई"]),

    ("settings.error",              ["Settings could not be saved", "Не удалось сохранить настройки", "सेटिंग्स सहेजी नहीं जा सकीं"]),
];

lazy_static! {
    pub static ref DICTIONARIES: HashMap<Language, HashMap<&'static str, &'static str>> =
        Language::ALL
            .into_iter()
            .enumerate()
            .map(|(index, lang)| {
                let dict = ENTRIES
                    .iter()
                    .map(|(key, texts)| (*key, texts[index]))
                    .collect();
                (lang, dict)
            })
            .collect();

    /// All keys of the built-in dictionaries.
    pub static ref KEYS: Vec<&'static str> = ENTRIES.iter().map(|(key, _)| *key).collect();
}
